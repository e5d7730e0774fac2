//! Singular value decomposition and the multi-parameter linear fit built on
//! top of it.
//!
//! `svd_decompose` and `svd_back_substitute` are a direct port of the
//! Forsythe-style two-sided Householder reduction and implicit-shift QR
//! diagonalization used by the Numerical Recipes `svdcmp`/`svbksb` pair,
//! re-expressed over `ndarray::Array2<f32>` instead of 1-D row-major
//! pointer arithmetic.

use ndarray::Array2;

use crate::error::{Result, VpProfileError};

/// Maximum number of fit parameters a single call supports.
pub const N_PARS_FITTED_MAX: usize = 16;

/// Singular values at or below `SVDTOL * max(singular values)` are treated
/// as zero during back-substitution.
pub const SVD_TOL: f32 = 1e-5;

const N_ITERATIONS_MAX: u32 = 30;

fn sign(x: f32) -> f32 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}

fn pythag(a: f32, b: f32) -> f32 {
    let (a, b) = (a.abs(), b.abs());
    if a > b {
        a * (1.0 + (b / a).powi(2)).sqrt()
    } else if b == 0.0 {
        0.0
    } else {
        b * (1.0 + (a / b).powi(2)).sqrt()
    }
}

/// Decomposes `a` (m rows by n columns, m >= n) in place as `A = U . diag(w) . V^T`.
///
/// On return `a` holds `U`, `w` holds the n singular values, and `v` holds
/// `V` itself (not its transpose).
///
/// Returns [`VpProfileError::SvdNonConvergent`] if a singular value fails
/// to converge within 30 QR sweeps.
pub fn svd_decompose(a: &mut Array2<f32>, w: &mut [f32], v: &mut Array2<f32>) -> Result<()> {
    let (m, n) = a.dim();
    assert_eq!(w.len(), n);
    assert_eq!(v.dim(), (n, n));

    let mut rv1 = vec![0.0f32; n];
    let mut anorm = 0.0f32;
    let mut g = 0.0f32;
    let mut scale = 0.0f32;
    let mut l;

    // Householder reduction to bidiagonal form.
    for i in 0..n {
        l = i + 1;
        rv1[i] = scale * g;
        g = 0.0;
        let mut s = 0.0f32;
        scale = 0.0;
        if i < m {
            for k in i..m {
                scale += a[[k, i]].abs();
            }
            if scale != 0.0 {
                for k in i..m {
                    a[[k, i]] /= scale;
                    s += a[[k, i]] * a[[k, i]];
                }
                let f = a[[i, i]];
                g = -s.sqrt() * sign(f);
                let h = f * g - s;
                a[[i, i]] = f - g;
                for j in l..n {
                    let mut s = 0.0f32;
                    for k in i..m {
                        s += a[[k, i]] * a[[k, j]];
                    }
                    let f = s / h;
                    for k in i..m {
                        a[[k, j]] += f * a[[k, i]];
                    }
                }
                for k in i..m {
                    a[[k, i]] *= scale;
                }
            }
        }
        w[i] = scale * g;
        g = 0.0;
        s = 0.0;
        scale = 0.0;
        if i < m && i != n - 1 {
            for k in l..n {
                scale += a[[i, k]].abs();
            }
            if scale != 0.0 {
                for k in l..n {
                    a[[i, k]] /= scale;
                    s += a[[i, k]] * a[[i, k]];
                }
                let f = a[[i, l]];
                g = -s.sqrt() * sign(f);
                let h = f * g - s;
                a[[i, l]] = f - g;
                for k in l..n {
                    rv1[k] = a[[i, k]] / h;
                }
                for j in l..m {
                    let mut s = 0.0f32;
                    for k in l..n {
                        s += a[[j, k]] * a[[i, k]];
                    }
                    for k in l..n {
                        a[[j, k]] += s * rv1[k];
                    }
                }
                for k in l..n {
                    a[[i, k]] *= scale;
                }
            }
        }
        anorm = anorm.max(w[i].abs() + rv1[i].abs());
    }

    // Accumulation of right-hand transformations.
    let mut l_saved = n;
    for i in (0..n).rev() {
        if i < n - 1 {
            if g != 0.0 {
                for j in l_saved..n {
                    v[[j, i]] = (a[[i, j]] / a[[i, l_saved]]) / g;
                }
                for j in l_saved..n {
                    let mut s = 0.0f32;
                    for k in l_saved..n {
                        s += a[[i, k]] * v[[k, j]];
                    }
                    for k in l_saved..n {
                        v[[k, j]] += s * v[[k, i]];
                    }
                }
            }
            for j in l_saved..n {
                v[[i, j]] = 0.0;
                v[[j, i]] = 0.0;
            }
        }
        v[[i, i]] = 1.0;
        g = rv1[i];
        l_saved = i;
    }

    // Accumulation of left-hand transformations.
    for i in (0..m.min(n)).rev() {
        let l = i + 1;
        g = w[i];
        for j in l..n {
            a[[i, j]] = 0.0;
        }
        if g != 0.0 {
            g = 1.0 / g;
            for j in l..n {
                let mut s = 0.0f32;
                for k in l..m {
                    s += a[[k, i]] * a[[k, j]];
                }
                let f = (s / a[[i, i]]) * g;
                for k in i..m {
                    a[[k, j]] += f * a[[k, i]];
                }
            }
            for j in i..m {
                a[[j, i]] *= g;
            }
        } else {
            for j in i..m {
                a[[j, i]] = 0.0;
            }
        }
        a[[i, i]] += 1.0;
    }

    // Diagonalization of the bidiagonal form.
    for k in (0..n).rev() {
        let mut converged = false;
        for iteration in 1..=N_ITERATIONS_MAX {
            let mut flag = true;
            let mut l = k;
            let mut nm = 0usize;
            loop {
                nm = l.wrapping_sub(1);
                if (rv1[l].abs() + anorm) == anorm {
                    flag = false;
                    break;
                }
                if l == 0 || (w[nm].abs() + anorm) == anorm {
                    break;
                }
                l -= 1;
            }
            if flag {
                let mut c = 0.0f32;
                let mut s = 1.0f32;
                for i in l..=k {
                    let f = s * rv1[i];
                    rv1[i] = c * rv1[i];
                    if (f.abs() + anorm) == anorm {
                        break;
                    }
                    g = w[i];
                    let h = pythag(f, g);
                    w[i] = h;
                    let h = 1.0 / h;
                    c = g * h;
                    s = -f * h;
                    for j in 0..m {
                        let y = a[[j, nm]];
                        let z = a[[j, i]];
                        a[[j, nm]] = y * c + z * s;
                        a[[j, i]] = z * c - y * s;
                    }
                }
            }

            let mut z = w[k];
            if l == k {
                if z < 0.0 {
                    w[k] = -z;
                    for j in 0..n {
                        v[[j, k]] = -v[[j, k]];
                    }
                }
                converged = true;
                break;
            }
            if iteration == N_ITERATIONS_MAX {
                return Err(VpProfileError::SvdNonConvergent);
            }

            let x = w[l];
            let nm = k - 1;
            let y = w[nm];
            let mut g_local = rv1[nm];
            let mut h = rv1[k];
            let mut f = ((y - z) * (y + z) + (g_local - h) * (g_local + h)) / (2.0 * h * y);
            g_local = pythag(f, 1.0);
            f = ((x - z) * (x + z) + h * ((y / (f + g_local * sign(f))) - h)) / x;

            let mut c = 1.0f32;
            let mut s = 1.0f32;
            let mut x = x;
            for j in l..=nm {
                let i = j + 1;
                g_local = rv1[i];
                let mut y_local = w[i];
                h = s * g_local;
                g_local *= c;
                z = pythag(f, h);
                rv1[j] = z;
                c = f / z;
                s = h / z;
                f = x * c + g_local * s;
                g_local = g_local * c - x * s;
                h = y_local * s;
                y_local *= c;
                for jj in 0..n {
                    let xx = v[[jj, j]];
                    let zz = v[[jj, i]];
                    v[[jj, j]] = xx * c + zz * s;
                    v[[jj, i]] = zz * c - xx * s;
                }
                z = pythag(f, h);
                w[j] = z;
                if z != 0.0 {
                    let inv = 1.0 / z;
                    c = f * inv;
                    s = h * inv;
                }
                f = c * g_local + s * y_local;
                x = c * y_local - s * g_local;
                for jj in 0..m {
                    let yy = a[[jj, j]];
                    let zz = a[[jj, i]];
                    a[[jj, j]] = yy * c + zz * s;
                    a[[jj, i]] = zz * c - yy * s;
                }
            }
            rv1[l] = 0.0;
            rv1[k] = f;
            w[k] = x;
        }
        if !converged {
            return Err(VpProfileError::SvdNonConvergent);
        }
    }

    Ok(())
}

/// Solves `A . x = b` given the `U`, `w`, `V` produced by [`svd_decompose`].
///
/// Singular values of zero are treated as infinite and contribute nothing
/// (the usual pseudo-inverse convention).
pub fn svd_back_substitute(u: &Array2<f32>, w: &[f32], v: &Array2<f32>, b: &[f32], x: &mut [f32]) {
    let (m, n) = u.dim();
    let mut tmp = vec![0.0f32; n];
    for j in 0..n {
        let mut sum = 0.0f32;
        if w[j] != 0.0 {
            for i in 0..m {
                sum += u[[i, j]] * b[i];
            }
            sum /= w[j];
        }
        tmp[j] = sum;
    }
    for j in 0..n {
        let mut sum = 0.0f32;
        for jj in 0..n {
            sum += v[[j, jj]] * tmp[jj];
        }
        x[j] = sum;
    }
}

/// A basis of functions a multi-parameter linear fit is expressed in terms
/// of: `y = sum_i params[i] * evaluate(point)[i]`.
pub trait Basis {
    /// Dimensionality of a single sample point (e.g. 2 for azimuth+elevation).
    fn dims(&self) -> usize;
    /// Number of fit parameters (basis functions).
    fn n_params(&self) -> usize;
    /// Evaluates the basis functions at `point` (length [`Basis::dims`]),
    /// writing `n_params` values into `out`.
    fn evaluate(&self, point: &[f32], out: &mut [f32]) -> Result<()>;
}

/// Result of [`linear_fit`].
#[derive(Debug, Clone)]
pub struct FitResult {
    /// Fitted parameter values.
    pub params: Vec<f32>,
    /// Variance of each fitted parameter.
    pub variances: Vec<f32>,
    /// Model value at each input sample.
    pub y_fit: Vec<f32>,
    /// Reduced chi-square: `sum((y_obs - y_fit)^2) / (n_points - n_params)`.
    pub chisq: f32,
}

/// Fits `y_obs` against `points` (a flat `n_points * basis.dims()` array of
/// sample coordinates) using `basis`, via singular value decomposition.
pub fn linear_fit<B: Basis>(
    points: &[f32],
    basis: &B,
    y_obs: &[f32],
    n_points: usize,
) -> Result<FitResult> {
    let n_params = basis.n_params();
    let dims = basis.dims();

    if n_params > N_PARS_FITTED_MAX {
        return Err(VpProfileError::ConfigInvalid(format!(
            "fit has {n_params} parameters, exceeds the maximum of {N_PARS_FITTED_MAX}"
        )));
    }
    if n_points <= n_params {
        return Err(VpProfileError::ConfigInvalid(format!(
            "fit has only {n_points} points for {n_params} parameters"
        )));
    }

    let mut u = Array2::<f32>::zeros((n_points, n_params));
    let mut afunc = vec![0.0f32; n_params];
    for i_point in 0..n_points {
        let point = &points[i_point * dims..(i_point + 1) * dims];
        basis.evaluate(point, &mut afunc)?;
        for i_par in 0..n_params {
            u[[i_point, i_par]] = afunc[i_par];
        }
    }

    let mut w = vec![0.0f32; n_params];
    let mut v = Array2::<f32>::zeros((n_params, n_params));
    svd_decompose(&mut u, &mut w, &mut v)?;

    let w_max = w.iter().cloned().fold(0.0f32, f32::max);
    for wi in w.iter_mut() {
        if *wi < SVD_TOL * w_max {
            *wi = 0.0;
        }
    }

    let mut params = vec![0.0f32; n_params];
    svd_back_substitute(&u, &w, &v, y_obs, &mut params);

    let wti: Vec<f32> = w
        .iter()
        .map(|&wi| if wi != 0.0 { 1.0 / (wi * wi) } else { 0.0 })
        .collect();

    // variances[i] = sum_j V[j][i]^2 * wti[j] -- see DESIGN.md Open question 2.
    let mut variances = vec![0.0f32; n_params];
    for i in 0..n_params {
        let mut acc = 0.0f32;
        for j in 0..n_params {
            acc += v[[j, i]] * v[[j, i]] * wti[j];
        }
        variances[i] = acc;
    }

    let mut y_fit = vec![0.0f32; n_points];
    let mut chisq = 0.0f32;
    for i_point in 0..n_points {
        let point = &points[i_point * dims..(i_point + 1) * dims];
        basis.evaluate(point, &mut afunc)?;
        let mut sum = 0.0f32;
        for i_par in 0..n_params {
            sum += params[i_par] * afunc[i_par];
        }
        y_fit[i_point] = sum;
        chisq += (y_obs[i_point] - sum).powi(2);
    }
    chisq /= (n_points - n_params) as f32;

    Ok(FitResult {
        params,
        variances,
        y_fit,
        chisq,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plane;

    impl Basis for Plane {
        fn dims(&self) -> usize {
            2
        }
        fn n_params(&self) -> usize {
            3
        }
        fn evaluate(&self, point: &[f32], out: &mut [f32]) -> Result<()> {
            out[0] = point[0];
            out[1] = point[1];
            out[2] = 1.0;
            Ok(())
        }
    }

    #[test]
    fn fits_an_exact_plane() {
        // y = 2x + 3y_coord - 1, sampled without noise.
        let basis = Plane;
        let mut points = Vec::new();
        let mut y_obs = Vec::new();
        for i in 0..10 {
            for j in 0..10 {
                let x = i as f32;
                let y = j as f32;
                points.push(x);
                points.push(y);
                y_obs.push(2.0 * x + 3.0 * y - 1.0);
            }
        }
        let result = linear_fit(&points, &basis, &y_obs, 100).unwrap();
        assert!((result.params[0] - 2.0).abs() < 1e-3);
        assert!((result.params[1] - 3.0).abs() < 1e-3);
        assert!((result.params[2] + 1.0).abs() < 1e-3);
        assert!(result.chisq < 1e-6);
    }

    #[test]
    fn too_few_points_is_config_invalid() {
        let basis = Plane;
        let points = vec![0.0, 0.0, 1.0, 1.0];
        let y_obs = vec![0.0, 1.0];
        let err = linear_fit(&points, &basis, &y_obs, 2).unwrap_err();
        assert!(matches!(err, VpProfileError::ConfigInvalid(_)));
    }

    #[test]
    fn decompose_reconstructs_identity() {
        let mut a = Array2::<f32>::eye(3);
        let mut w = vec![0.0f32; 3];
        let mut v = Array2::<f32>::zeros((3, 3));
        svd_decompose(&mut a, &mut w, &mut v).unwrap();
        let mut sorted = w.clone();
        sorted.sort_by(|x, y| y.partial_cmp(x).unwrap());
        for s in sorted {
            assert!((s - 1.0).abs() < 1e-5);
        }
    }
}

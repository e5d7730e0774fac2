//! Per-gate bit-flag classification: why a gate is, or is not, admitted
//! into a given profile variant.

use crate::config::{self, Config};

use super::points::PointsTable;

/// A 9-bit flag set, one bit per reason a gate might be excluded from (or
/// included in) a profile variant. Named positions match the historical
/// numbering; bits are stored in the low 9 bits of a `u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GateCode(pub u32);

impl GateCode {
    pub const STATIC_CLUTTER: u32 = 1 << 0;
    pub const DYNAMIC_CLUTTER: u32 = 1 << 1;
    pub const DYNAMIC_CLUTTER_FRINGE: u32 = 1 << 2;
    pub const VRAD_MISSING: u32 = 1 << 3;
    pub const DBZ_TOO_HIGH: u32 = 1 << 4;
    pub const VRAD_TOO_LOW: u32 = 1 << 5;
    pub const VRAD_OUTLIER: u32 = 1 << 6;
    pub const AZIMUTH_TOO_LOW: u32 = 1 << 7;
    pub const AZIMUTH_TOO_HIGH: u32 = 1 << 8;

    pub fn has(self, bit: u32) -> bool {
        self.0 & bit != 0
    }
}

/// Sets bits 0,1,2,3,4,5,7,8 on every row of `table` from its current
/// (dBZ, vrad, azimuth, cell_label) values. Bit 6 (`VRAD_OUTLIER`) is left
/// untouched here; it is set per-pass by `core::profile::run`.
///
/// Bit 1 checks `cell_label == 1` and bit 2 checks `cell_label == 2`,
/// reproducing the historical mismatch against `core::cellanalyzer`'s
/// fringe label of `0` and its cells renumbered from `1` -- see
/// `DESIGN.md`'s Open Question 1. Bit 0 and bit 3 are always false: no
/// static clutter map or missing-vrad sentinel are wired into this table.
pub fn classify(table: &mut PointsTable, config: &Config) {
    for i in 0..table.len() {
        let mut code = 0u32;

        if table.cell_label[i] == 1 {
            code |= GateCode::DYNAMIC_CLUTTER;
        }
        if table.cell_label[i] == 2 {
            code |= GateCode::DYNAMIC_CLUTTER_FRINGE;
        }
        if table.dbz[i] > config::constants::DBZ_MAX {
            code |= GateCode::DBZ_TOO_HIGH;
        }
        if table.vrad[i].abs() < config::constants::VRAD_MIN {
            code |= GateCode::VRAD_TOO_LOW;
        }
        if table.azimuth[i] < config.azim_min {
            code |= GateCode::AZIMUTH_TOO_LOW;
        }
        if table.azimuth[i] > config.azim_max {
            code |= GateCode::AZIMUTH_TOO_HIGH;
        }

        // bit 6 preserved across classify() calls -- keep any VRAD_OUTLIER
        // flag a prior profile pass already set.
        code |= table.gate_code[i] & GateCode::VRAD_OUTLIER;

        table.gate_code[i] = code;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with_row(dbz: f32, vrad: f32, azimuth: f32, cell_label: i32) -> PointsTable {
        let windows = super::super::points::LayerWindows {
            from: vec![0],
            to: vec![1],
        };
        let mut table = PointsTable::preallocate(&windows);
        table.azimuth[0] = azimuth;
        table.elevation[0] = 0.5;
        table.dbz[0] = dbz;
        table.vrad[0] = vrad;
        table.cell_label[0] = cell_label;
        table.gate_code[0] = 0;
        table
    }

    #[test]
    fn flags_dbz_ceiling_and_vrad_floor() {
        let mut table = table_with_row(25.0, 0.5, 180.0, -1);
        let config = Config::default();
        classify(&mut table, &config);
        let code = GateCode(table.gate_code[0]);
        assert!(code.has(GateCode::DBZ_TOO_HIGH));
        assert!(code.has(GateCode::VRAD_TOO_LOW));
    }

    #[test]
    fn fringe_bit_never_sets_for_this_crates_fringe_label() {
        // core::cellanalyzer::grow_fringe labels fringe gates 0, but this
        // classifier's fringe bit checks cell_label == 2 -- an
        // intentionally preserved mismatch, not a bug to fix here.
        let mut table = table_with_row(5.0, 5.0, 180.0, 0);
        let config = Config::default();
        classify(&mut table, &config);
        let code = GateCode(table.gate_code[0]);
        assert!(!code.has(GateCode::DYNAMIC_CLUTTER_FRINGE));
    }

    #[test]
    fn azimuth_bounds_are_flagged() {
        let mut table = table_with_row(5.0, 5.0, 400.0, -1);
        let config = Config::default();
        classify(&mut table, &config);
        let code = GateCode(table.gate_code[0]);
        assert!(code.has(GateCode::AZIMUTH_TOO_HIGH));
    }
}

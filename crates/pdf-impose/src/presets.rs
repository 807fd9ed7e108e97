//! Presets: the fixed built-in imposition configurations, plus load/save for
//! user-saved presets kept as one JSON file per preset under a presets directory.

use crate::types::*;

/// The built-in presets that must always be present, keyed by their stable id.
pub fn builtin_presets() -> Vec<(&'static str, PresetConfig)> {
    vec![
        (
            "business_card_sra3",
            PresetConfig {
                name: "Business Card 90x55mm on SRA3, 24-up, 3mm bleed".to_string(),
                config: ImpositionConfig {
                    mode: ImpositionMode::StepAndRepeat,
                    trim_width: 90.0,
                    trim_height: 55.0,
                    bleed: BleedConfig {
                        top: 3.0,
                        bottom: 3.0,
                        left: 3.0,
                        right: 3.0,
                        uniform: true,
                    },
                    sheet: SheetConfig {
                        sheet_width: 320.0,
                        sheet_height: 450.0,
                        ..SheetConfig::default()
                    },
                    gap_between_items: 0.0,
                    auto_rotate: true,
                    ..ImpositionConfig::default()
                },
            },
        ),
        (
            "a5_saddle_sra3",
            PresetConfig {
                name: "A5 Saddle Stitch on SRA3, 4-up".to_string(),
                config: ImpositionConfig {
                    mode: ImpositionMode::BookletSaddleStitch,
                    trim_width: 148.0,
                    trim_height: 210.0,
                    bleed: BleedConfig {
                        top: 3.0,
                        bottom: 3.0,
                        left: 3.0,
                        right: 3.0,
                        uniform: true,
                    },
                    sheet: SheetConfig {
                        sheet_width: 320.0,
                        sheet_height: 450.0,
                        ..SheetConfig::default()
                    },
                    auto_rotate: true,
                    ..ImpositionConfig::default()
                },
            },
        ),
        (
            "a4_cut_stack_sra3",
            PresetConfig {
                name: "A4 on SRA3, 2-up, Cut & Stack".to_string(),
                config: ImpositionConfig {
                    mode: ImpositionMode::CutAndStack,
                    trim_width: 210.0,
                    trim_height: 297.0,
                    bleed: BleedConfig {
                        top: 3.0,
                        bottom: 3.0,
                        left: 3.0,
                        right: 3.0,
                        uniform: true,
                    },
                    sheet: SheetConfig {
                        sheet_width: 320.0,
                        sheet_height: 450.0,
                        ..SheetConfig::default()
                    },
                    auto_rotate: true,
                    ..ImpositionConfig::default()
                },
            },
        ),
        (
            "dl_flyer_sra4",
            PresetConfig {
                name: "DL Flyer on SRA4, 4-up with 2mm gap".to_string(),
                config: ImpositionConfig {
                    mode: ImpositionMode::StepAndRepeat,
                    trim_width: 99.0,
                    trim_height: 210.0,
                    bleed: BleedConfig {
                        top: 3.0,
                        bottom: 3.0,
                        left: 3.0,
                        right: 3.0,
                        uniform: true,
                    },
                    sheet: SheetConfig {
                        sheet_width: 225.0,
                        sheet_height: 320.0,
                        ..SheetConfig::default()
                    },
                    gap_between_items: 2.0,
                    auto_rotate: true,
                    ..ImpositionConfig::default()
                },
            },
        ),
        (
            "a6_postcard_sra3",
            PresetConfig {
                name: "A6 Postcard on SRA3, 8-up".to_string(),
                config: ImpositionConfig {
                    mode: ImpositionMode::StepAndRepeat,
                    trim_width: 105.0,
                    trim_height: 148.0,
                    bleed: BleedConfig {
                        top: 3.0,
                        bottom: 3.0,
                        left: 3.0,
                        right: 3.0,
                        uniform: true,
                    },
                    sheet: SheetConfig {
                        sheet_width: 320.0,
                        sheet_height: 450.0,
                        ..SheetConfig::default()
                    },
                    auto_rotate: true,
                    ..ImpositionConfig::default()
                },
            },
        ),
    ]
}

pub fn builtin_preset(id: &str) -> Option<PresetConfig> {
    builtin_presets().into_iter().find(|(key, _)| *key == id).map(|(_, p)| p)
}

/// Keep only `[A-Za-z0-9 _-]`, then trim. Empty after sanitizing means the name
/// was rejected outright by the caller.
pub fn sanitize_preset_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_' || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(feature = "serde")]
impl PresetConfig {
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Save under `dir` as `<sanitized name>.json`. Errors if the sanitized name is empty.
    pub async fn save(&self, dir: impl AsRef<std::path::Path>) -> Result<String> {
        let safe_name = sanitize_preset_name(&self.name);
        if safe_name.is_empty() {
            return Err(ImposeError::InvalidConfig("invalid preset name".to_string()));
        }
        let path = dir.as_ref().join(format!("{safe_name}.json"));
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(safe_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_presets_cover_the_required_ids() {
        let ids: Vec<&str> = builtin_presets().into_iter().map(|(id, _)| id).collect();
        for expected in [
            "business_card_sra3",
            "a5_saddle_sra3",
            "a4_cut_stack_sra3",
            "dl_flyer_sra4",
            "a6_postcard_sra3",
        ] {
            assert!(ids.contains(&expected), "missing built-in preset {expected}");
        }
    }

    #[test]
    fn sanitize_strips_disallowed_characters() {
        assert_eq!(sanitize_preset_name("My Preset #1!"), "My Preset 1");
        assert_eq!(sanitize_preset_name("  ../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_preset_name("   "), "");
    }
}

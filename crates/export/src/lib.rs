//! Persistence and report helpers.

pub mod ignitors {
    //! Delimited string form of an ignition-resource list.
    //!
    //! Each resource is written as `name:amount/scaled/potential/required` and
    //! resources are joined with `;`. Names holding a delimiter or surrounding
    //! whitespace cannot be written.

    use std::num::ParseFloatError;

    use mixer_ignition::IgnitionResource;
    use thiserror::Error;

    #[derive(Debug, Error, PartialEq)]
    pub enum CodecError {
        #[error("ignitor entry `{0}` has no `:` separator")]
        MissingSeparator(String),
        #[error("ignitor entry `{entry}` has {count} values, expected 4")]
        FieldCount { entry: String, count: usize },
        #[error("ignitor entry `{entry}` has an invalid number: {source}")]
        Number {
            entry: String,
            #[source]
            source: ParseFloatError,
        },
        #[error("ignitor entry `{entry}` has an invalid flag `{value}`")]
        Flag { entry: String, value: String },
        #[error("ignitor name `{0}` cannot be persisted")]
        UnsupportedName(String),
    }

    fn is_persistable(name: &str) -> bool {
        !name.is_empty() && name.trim() == name && !name.contains([':', '/', ';'])
    }

    pub fn encode_one(resource: &IgnitionResource) -> Result<String, CodecError> {
        if !is_persistable(&resource.resource_name) {
            return Err(CodecError::UnsupportedName(resource.resource_name.clone()));
        }
        Ok(format!(
            "{}:{}/{}/{}/{}",
            resource.resource_name,
            resource.amount,
            resource.scaled_amount,
            resource.added_ignition_potential,
            resource.always_required
        ))
    }

    pub fn encode(resources: &[IgnitionResource]) -> Result<String, CodecError> {
        let entries = resources
            .iter()
            .map(encode_one)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries.join(";"))
    }

    pub fn decode_one(entry: &str) -> Result<IgnitionResource, CodecError> {
        let (name, values) = entry
            .split_once(':')
            .ok_or_else(|| CodecError::MissingSeparator(entry.to_string()))?;
        let values: Vec<&str> = values.split('/').collect();
        let &[amount, scaled, potential, required] = values.as_slice() else {
            return Err(CodecError::FieldCount {
                entry: entry.to_string(),
                count: values.len(),
            });
        };

        let number = |value: &str| {
            value.trim().parse::<f64>().map_err(|source| CodecError::Number {
                entry: entry.to_string(),
                source,
            })
        };
        let always_required = match required.trim().to_ascii_lowercase().as_str() {
            "true" => true,
            "false" => false,
            _ => {
                return Err(CodecError::Flag {
                    entry: entry.to_string(),
                    value: required.to_string(),
                });
            }
        };

        Ok(IgnitionResource {
            resource_name: name.trim().to_string(),
            amount: number(amount)?,
            scaled_amount: number(scaled)?,
            added_ignition_potential: number(potential)?,
            always_required,
        })
    }

    /// Parse a persisted list; blank segments are ignored.
    pub fn decode(encoded: &str) -> Result<Vec<IgnitionResource>, CodecError> {
        encoded
            .split(';')
            .filter(|entry| !entry.trim().is_empty())
            .map(decode_one)
            .collect()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn list_survives_a_round_trip() {
            let resources = vec![
                IgnitionResource::new("ElectricCharge", 0.04)
                    .with_always_required(true)
                    .with_added_potential(0.1),
                IgnitionResource::scaled("TEATEB", 0.125).with_added_potential(1.0),
            ];
            let encoded = encode(&resources).unwrap();
            assert_eq!(
                encoded,
                "ElectricCharge:0.04/0/0.1/true;TEATEB:0/0.125/1/false"
            );
            assert_eq!(decode(&encoded).unwrap(), resources);
        }

        #[test]
        fn names_with_delimiters_are_not_written() {
            for name in ["Spark:Plug", "A/B", "x;y", " Spark", "Spark ", ""] {
                let resources = [
                    IgnitionResource::new("TEATEB", 1.0),
                    IgnitionResource::new(name, 1.0),
                ];
                assert_eq!(
                    encode(&resources),
                    Err(CodecError::UnsupportedName(name.to_string()))
                );
            }
        }

        #[test]
        fn accepts_capitalized_flags_and_blank_segments() {
            let decoded = decode("Spark:1.000/0.000/0.500/True;;").unwrap();
            assert_eq!(decoded.len(), 1);
            assert!(decoded[0].always_required);
            assert_eq!(decoded[0].added_ignition_potential, 0.5);
            assert!(decode("").unwrap().is_empty());
        }

        #[test]
        fn malformed_entries_are_rejected() {
            assert!(matches!(
                decode("Spark"),
                Err(CodecError::MissingSeparator(_))
            ));
            assert!(matches!(
                decode("Spark:1/2/3"),
                Err(CodecError::FieldCount { count: 3, .. })
            ));
            assert!(matches!(
                decode("Spark:1/x/3/true"),
                Err(CodecError::Number { .. })
            ));
            assert!(matches!(
                decode("Spark:1/2/3/maybe"),
                Err(CodecError::Flag { .. })
            ));
        }
    }
}

pub mod report {
    use std::fs::{self, File};
    use std::io::{self, BufWriter, Write};
    use std::path::Path;

    use mixer_propulsion::PropellantCombination;
    use mixer_rescale::{RescaledStats, ThrusterBaseline};
    use serde::Serialize;
    use serde_json::to_writer_pretty;

    /// Create a writer for the target path, handling stdout (`-`) by convention.
    pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
        if path == Path::new("-") {
            return Ok(Box::new(BufWriter::new(io::stdout())));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        Ok(Box::new(BufWriter::new(file)))
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct PropellantEntry {
        pub name: String,
        pub ratio: f64,
        pub draw_gauge: bool,
        pub ignore_for_isp: bool,
    }

    /// Serialized view of a resolved combination.
    #[derive(Debug, Clone, Serialize)]
    pub struct CombinationSummary {
        pub ratios: String,
        pub source: String,
        pub propellants: Vec<PropellantEntry>,
        pub thrust_multiplier: f64,
        pub isp_multiplier: f64,
        pub ignition_potential: f64,
        pub tank_density: f64,
    }

    impl From<&PropellantCombination> for CombinationSummary {
        fn from(combination: &PropellantCombination) -> Self {
            Self {
                ratios: combination.ratio_string(),
                source: combination.source().to_string(),
                propellants: combination
                    .propellants()
                    .iter()
                    .map(|p| PropellantEntry {
                        name: p.name.clone(),
                        ratio: p.ratio,
                        draw_gauge: p.draw_gauge,
                        ignore_for_isp: p.ignore_for_isp,
                    })
                    .collect(),
                thrust_multiplier: combination.thrust_multiplier(),
                isp_multiplier: combination.isp_multiplier(),
                ignition_potential: combination.ignition_potential(),
                tank_density: combination.tank_density(),
            }
        }
    }

    /// Everything `mixer resolve` knows about one thruster.
    #[derive(Debug, Serialize)]
    pub struct ResolutionReport<'a> {
        pub thruster: &'a str,
        pub kind: &'a str,
        pub original: Option<CombinationSummary>,
        pub current: Option<CombinationSummary>,
        pub baseline: Option<&'a ThrusterBaseline>,
        pub stats: Option<&'a RescaledStats>,
        pub thrust_change_percent: Option<f64>,
        pub isp_change_percent: Option<f64>,
        pub ignition_resources: Vec<String>,
    }

    pub fn write_report(writer: &mut dyn Write, report: &ResolutionReport<'_>) -> io::Result<()> {
        to_writer_pretty(&mut *writer, report)?;
        writeln!(writer)?;
        writer.flush()
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use mixer_propulsion::{CombinationSource, Propellant, PropellantDatabase};

        #[test]
        fn report_serializes_combinations_and_stats() {
            let db = PropellantDatabase::default();
            let combination = PropellantCombination::new(
                vec![
                    Propellant::new("LiquidFuel", 0.45).with_draw_gauge(true),
                    Propellant::new("Oxidizer", 0.55),
                ],
                &db,
                CombinationSource::FuelOxidizerPair,
            );
            let baseline = ThrusterBaseline {
                max_thrust: 215.0,
                isp_vacuum: 320.0,
                isp_sea_level: Some(250.0),
            };
            let report = ResolutionReport {
                thruster: "LV-T45",
                kind: "engine",
                original: Some(CombinationSummary::from(&combination)),
                current: None,
                baseline: Some(&baseline),
                stats: None,
                thrust_change_percent: None,
                isp_change_percent: None,
                ignition_resources: vec!["0.5 ElectricCharge (always consumed)".into()],
            };

            let mut buffer = Vec::new();
            write_report(&mut buffer, &report).unwrap();
            let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
            assert_eq!(value["thruster"], "LV-T45");
            assert_eq!(value["original"]["ratios"], "9 LiquidFuel : 11 Oxidizer");
            assert_eq!(value["original"]["source"], "fuel/oxidizer pair");
            assert_eq!(value["baseline"]["isp_sea_level"], 250.0);
            assert!(value["current"].is_null());
        }
    }
}

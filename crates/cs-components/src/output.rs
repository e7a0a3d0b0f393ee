//! Output component: file format and parallel I/O tuning for the solver.

use crate::component::ComponentCore;
use crate::error::ComponentResult;
use crate::traits::Component;
use cs_inventory::{PropertySchema, SchemaField, SchemaResult, Validator};
use std::str::FromStr;

const MEGA: i64 = 1024 * 1024;

/// On-disk format written by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One ASCII file per process on local disk.
    AsciiLocal,
    Ascii,
    Hdf5,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [
        OutputFormat::AsciiLocal,
        OutputFormat::Ascii,
        OutputFormat::Hdf5,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::AsciiLocal => "ascii-local",
            OutputFormat::Ascii => "ascii",
            OutputFormat::Hdf5 => "hdf5",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutputFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("unknown output format '{s}'"))
    }
}

/// Declared fields of the output component.
pub fn output_schema() -> SchemaResult<PropertySchema> {
    let positive = |name: &str, default: i64, description: &str| {
        SchemaField::integer(name, default)
            .with_validator(Validator::Positive)
            .with_description(description)
    };

    PropertySchema::new("output")
        .declare(
            SchemaField::string("output_format", OutputFormat::AsciiLocal.as_str())
                .with_validator(Validator::choice(OutputFormat::ALL.map(OutputFormat::as_str)))
                .with_description("file format of solver output"),
        )?
        .declare(
            SchemaField::string("output_optional", "surf,botm")
                .with_description("comma-separated optional output fields"),
        )?
        .declare(positive("cb_block_size", MEGA, "MPI-IO collective buffer block size"))?
        .declare(positive("cb_buffer_size", 4 * MEGA, "MPI-IO collective buffer size"))?
        .declare(positive("sieve_buf_size", MEGA, "HDF5 data sieve buffer size"))?
        .declare(positive("output_alignment", MEGA / 4, "HDF5 memory alignment"))?
        .declare(positive(
            "output_alignment_threshold",
            MEGA / 2,
            "HDF5 alignment threshold",
        ))?
        .declare(positive("cache_mdc_nelmts", 10330, "HDF5 metadata cache elements"))?
        .declare(positive("cache_rdcc_nelmts", 521, "HDF5 chunk cache elements"))?
        .declare(positive("cache_rdcc_nbytes", MEGA, "HDF5 chunk cache bytes"))
}

/// Configures what the solver writes and how.
#[derive(Debug, Clone)]
pub struct Output {
    core: ComponentCore,
}

impl Output {
    pub fn new() -> ComponentResult<Self> {
        Self::with_name("output", "output")
    }

    pub fn with_name(name: &str, facility: &str) -> ComponentResult<Self> {
        Ok(Self {
            core: ComponentCore::new(name, facility, output_schema()?),
        })
    }

    /// Selected output format, once configured.
    pub fn format(&self) -> ComponentResult<OutputFormat> {
        let resolved = self.core.resolved_or("read output format of")?;
        // The choice validator admits only known formats.
        Ok(resolved
            .get_str("output_format")
            .and_then(|s| s.parse().ok())
            .unwrap_or(OutputFormat::AsciiLocal))
    }

    /// Optional output fields requested in `output_optional`, in order.
    pub fn optional_outputs(&self) -> ComponentResult<Vec<String>> {
        let resolved = self.core.resolved_or("read optional outputs of")?;
        Ok(resolved
            .get_str("output_optional")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect())
    }
}

impl Component for Output {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cs_inventory::{Overrides, PropertyValue};

    #[test]
    fn schema_declares_ten_fields() {
        let schema = output_schema().unwrap();
        assert_eq!(schema.len(), 10);
        assert_eq!(schema.name(), "output");
    }

    #[test]
    fn format_parses_configured_choice() {
        let mut output = Output::new().unwrap();
        let mut overrides = Overrides::new();
        overrides.insert("output_format".into(), "hdf5".into());
        output.configure(&overrides).unwrap();
        assert_eq!(output.format().unwrap(), OutputFormat::Hdf5);
    }

    #[test]
    fn optional_outputs_split_and_trim() {
        let mut output = Output::new().unwrap();
        let mut overrides = Overrides::new();
        overrides.insert(
            "output_optional".into(),
            PropertyValue::from(" surf, botm,,geoid "),
        );
        output.configure(&overrides).unwrap();
        assert_eq!(
            output.optional_outputs().unwrap(),
            vec!["surf", "botm", "geoid"]
        );
    }

    #[test]
    fn accessors_require_configuration() {
        let output = Output::new().unwrap();
        assert!(output.format().is_err());
        assert!(output.optional_outputs().is_err());
    }

    #[test]
    fn format_round_trips_through_str() {
        for f in OutputFormat::ALL {
            assert_eq!(f.as_str().parse::<OutputFormat>().unwrap(), f);
        }
        assert!("json".parse::<OutputFormat>().is_err());
    }
}

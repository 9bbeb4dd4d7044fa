//! The `diel` and `monthly` commands: detection table in, activity table out.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use tracing::{debug, info, warn};

use crate::cli::{ActivityArgs, MonthlyArgs};
use crate::config::{Config, OutputFormat};
use crate::constants::output_suffixes;
use crate::critters::{
    ActivityObservations, ActivityRow, ActivityShape, Detection, RowOptions, StationRegistry,
    site_of,
};
use crate::error::{Error, Result};
use crate::input::{read_detections, read_stations};
use crate::output::{ActivityCsvWriter, ActivityJsonWriter, OutputWriter};
use crate::pipeline::paths::resolve_output;
use crate::utils::date::parse_utc_offset;

/// Outcome of an activity run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityResult {
    /// Detections read.
    pub detections: usize,
    /// Rows written.
    pub rows: usize,
    /// Activity table written.
    pub output: PathBuf,
}

/// Diel activity: counts by hour of day.
pub fn execute_diel(args: &ActivityArgs, config: &Config) -> Result<ActivityResult> {
    execute(
        args,
        ActivityShape::Diel,
        None,
        output_suffixes::DIEL_ACTIVITY,
        config,
    )
}

/// Monthly activity: counts by month, optionally with per-day rates.
pub fn execute_monthly(args: &MonthlyArgs, config: &Config) -> Result<ActivityResult> {
    let stations = args
        .stations
        .clone()
        .or_else(|| config.defaults.stations_file.clone());
    if args.per_day && stations.is_none() {
        return Err(Error::StationsRequired);
    }

    execute(
        &args.activity,
        ActivityShape::Monthly {
            per_day: args.per_day,
        },
        stations.as_deref(),
        output_suffixes::MONTHLY_ACTIVITY,
        config,
    )
}

fn execute(
    args: &ActivityArgs,
    shape: ActivityShape,
    stations: Option<&Path>,
    suffix: &str,
    config: &Config,
) -> Result<ActivityResult> {
    let by_site = args.by_site || config.defaults.by_site;
    let mut groups = merge_groups(&config.groups, args);
    let offset = resolve_utc_offset(args.utc_offset, config)?;

    let mut detections = read_detections(&args.input)?;
    info!(
        "Read {} detections from {}",
        detections.len(),
        args.input.display()
    );
    if detections.is_empty() {
        warn!("No detections in {}", args.input.display());
    }

    if let Some(offset) = offset {
        debug!("Expressing detections in UTC offset {offset}");
        for detection in &mut detections {
            detection.rezone(offset);
        }
    }

    let mut registry = stations.map(read_stations).transpose()?;
    if let Some(registry) = &registry {
        info!("Read {} stations", registry.len());
    }

    if by_site {
        detections = detections.into_iter().map(to_site).collect();
        registry = registry.as_ref().map(StationRegistry::sites);
        groups = groups_by_site(groups);
    }

    let observations =
        ActivityObservations::from_detections(shape, &groups, registry, &detections)?;
    let rows = observations.rows(RowOptions {
        probabilities: args.probabilities || config.defaults.probabilities,
        include_total: args.total || config.defaults.total,
    })?;

    let format = args.format.unwrap_or(config.output.format);
    let output = resolve_output(args.output.as_deref(), &args.input, suffix, format.extension());
    let mut writer: Box<dyn OutputWriter<Record = ActivityRow>> = match format {
        OutputFormat::Csv => Box::new(ActivityCsvWriter::new(
            &output,
            observations.column_headers(),
            config.output.csv_bom && !args.no_bom,
        )?),
        OutputFormat::Json => Box::new(ActivityJsonWriter::new(
            &output,
            &args.input.to_string_lossy(),
            shape,
        )),
    };

    writer.write_header()?;
    for row in &rows {
        writer.write_record(row)?;
    }
    writer.finalize()?;

    info!(
        "Wrote {} activity rows for {} stations and {} groups: {}",
        rows.len(),
        observations.stations().count(),
        observations.groups().len(),
        output.display()
    );

    Ok(ActivityResult {
        detections: detections.len(),
        rows: rows.len(),
        output,
    })
}

/// Groups from config, overridden by groups of the same name on the command line.
fn merge_groups(
    configured: &BTreeMap<String, Vec<String>>,
    args: &ActivityArgs,
) -> BTreeMap<String, Vec<String>> {
    let mut groups = configured.clone();
    for group in &args.groups {
        groups.insert(group.name.clone(), group.stations.clone());
    }
    groups
}

/// Replace group members by their sites, keeping the first occurrence of each.
fn groups_by_site(groups: BTreeMap<String, Vec<String>>) -> BTreeMap<String, Vec<String>> {
    groups
        .into_iter()
        .map(|(name, members)| {
            let mut sites: Vec<String> = Vec::with_capacity(members.len());
            for member in &members {
                let site = site_of(member);
                if !sites.iter().any(|s| s == site) {
                    sites.push(site.to_string());
                }
            }
            (name, sites)
        })
        .collect()
}

fn resolve_utc_offset(
    explicit: Option<FixedOffset>,
    config: &Config,
) -> Result<Option<FixedOffset>> {
    if explicit.is_some() {
        return Ok(explicit);
    }
    config
        .defaults
        .utc_offset
        .as_deref()
        .map(|value| {
            parse_utc_offset(value).ok_or_else(|| Error::ConfigValidation {
                message: format!("utc_offset is not a valid UTC offset: '{value}'"),
            })
        })
        .transpose()
}

fn to_site(detection: Detection) -> Detection {
    let site = site_of(detection.station()).to_string();
    let identification = detection.identification().to_string();
    detection.relabel(&site, &identification)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::GroupArg;

    fn activity_args(groups: Vec<GroupArg>) -> ActivityArgs {
        ActivityArgs {
            input: PathBuf::from("detections.csv"),
            groups,
            probabilities: false,
            total: false,
            by_site: false,
            utc_offset: None,
            format: None,
            output: None,
            no_bom: false,
        }
    }

    #[test]
    fn test_cli_groups_override_config() {
        let mut config = Config::default();
        config
            .groups
            .insert("north".to_string(), vec!["A".to_string()]);
        config
            .groups
            .insert("south".to_string(), vec!["C".to_string()]);

        let args = activity_args(vec![GroupArg {
            name: "north".to_string(),
            stations: vec!["A".to_string(), "B".to_string()],
        }]);

        let groups = merge_groups(&config.groups, &args);
        assert_eq!(groups["north"], ["A", "B"]);
        assert_eq!(groups["south"], ["C"]);
    }

    #[test]
    fn test_groups_collapse_to_sites() {
        let groups = BTreeMap::from([
            (
                "north".to_string(),
                vec!["HOLA1".to_string(), "HOLA2".to_string(), "BRUN1".to_string()],
            ),
            ("south".to_string(), vec!["KEL".to_string()]),
        ]);

        let sites = groups_by_site(groups);
        assert_eq!(sites["north"], ["HOLA", "BRUN"]);
        assert_eq!(sites["south"], ["KEL"]);
    }

    #[test]
    fn test_utc_offset_from_config() {
        let mut config = Config::default();
        assert_eq!(resolve_utc_offset(None, &config).unwrap(), None);

        config.defaults.utc_offset = Some("-8".to_string());
        let offset = resolve_utc_offset(None, &config).unwrap().unwrap();
        assert_eq!(offset.local_minus_utc(), -8 * 3600);

        let explicit = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(
            resolve_utc_offset(Some(explicit), &config).unwrap(),
            Some(explicit)
        );
    }

    #[test]
    fn test_per_day_without_stations_fails() {
        let args = MonthlyArgs {
            activity: activity_args(vec![]),
            stations: None,
            per_day: true,
        };
        assert!(matches!(
            execute_monthly(&args, &Config::default()),
            Err(Error::StationsRequired)
        ));
    }
}

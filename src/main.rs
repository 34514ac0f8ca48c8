use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::*;
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use squadload::acwr::AcwrCalculator;
use squadload::export::{self, parse_columns, ExportFormat};
use squadload::logging::init_logging;
use squadload::summary::{
    LoadProgression, PlayerComparison, PlayerProfile, RecordFilter, SquadAcwrSummary,
    TeamOverview,
};
use squadload::weekly::WorkloadAggregator;
use squadload::zones::ZoneClassifier;
use squadload::{
    AppConfig, CsvImporter, FixtureGenerator, MetricKey, Position, SessionRecord, SessionType,
    SquadLoadError, Zone,
};

/// SquadLoad - GPS Workload Monitoring CLI
///
/// Normalizes STATSports and Catapult exports, classifies session metrics
/// against sport benchmarks and tracks the acute:chronic workload ratio.
#[derive(Parser)]
#[command(name = "squadload")]
#[command(author = "SquadLoad Contributors")]
#[command(version = "0.1.0")]
#[command(about = "GPS workload monitoring for team sports", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize and validate a GPS export
    Import {
        /// Input CSV file (STATSports, Catapult or canonical)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Classify a single metric value against the benchmarks
    Classify {
        /// Metric key (total_distance, hsr_distance, sprint_distance, accel_count, decel_count, player_load)
        #[arg(short, long)]
        metric: MetricKey,

        /// Session value
        #[arg(long, allow_hyphen_values = true)]
        value: Decimal,
    },

    /// Weekly load per athlete
    Weekly {
        #[arg(short, long)]
        file: PathBuf,

        /// Only this athlete
        #[arg(short, long)]
        athlete: Option<String>,

        /// Also write the aggregates as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Squad acute:chronic workload ratio
    Acwr {
        #[arg(short, long)]
        file: PathBuf,

        /// Chronic window in weeks
        #[arg(long)]
        chronic_weeks: Option<usize>,

        /// Acute window in weeks
        #[arg(long)]
        acute_weeks: Option<usize>,

        /// Weekly metric to use (default from config: player_load)
        #[arg(short, long)]
        metric: Option<MetricKey>,

        /// Write results as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Write results as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Squad averages for the most recent session
    Overview {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Individual athlete profile and load trend
    Player {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long)]
        athlete: String,
    },

    /// Compare athletes' mean session metrics
    Compare {
        #[arg(short, long)]
        file: PathBuf,

        /// Comma-separated athlete names
        #[arg(short, long, value_delimiter = ',', required = true)]
        athletes: Vec<String>,
    },

    /// Squad weekly load progression with a +10% target
    Progression {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "player_load")]
        metric: MetricKey,
    },

    /// Filtered re-export of session records, newest first
    Export {
        #[arg(short, long)]
        file: PathBuf,

        /// Output path (.csv or .json)
        #[arg(short, long)]
        output: PathBuf,

        /// Comma-separated canonical headers, in output order
        #[arg(long)]
        columns: Option<String>,

        /// First date to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last date to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        #[arg(short, long)]
        athlete: Option<String>,

        #[arg(long)]
        position: Option<Position>,

        #[arg(long)]
        session_type: Option<SessionType>,
    },

    /// Write deterministic synthetic squad data as canonical CSV
    Generate {
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long)]
        athletes: Option<usize>,

        #[arg(long)]
        weeks: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show the active benchmark table
    Benchmarks,
}

#[derive(Tabled)]
struct WeeklyRow {
    #[tabled(rename = "Player")]
    player: String,
    #[tabled(rename = "Week")]
    week: String,
    #[tabled(rename = "Sessions")]
    sessions: u32,
    #[tabled(rename = "Distance (m)")]
    distance: String,
    #[tabled(rename = "HSR (m)")]
    hsr: String,
    #[tabled(rename = "Sprint (m)")]
    sprint: String,
    #[tabled(rename = "Accels")]
    accels: String,
    #[tabled(rename = "Decels")]
    decels: String,
    #[tabled(rename = "Load (AU)")]
    load: String,
}

#[derive(Tabled)]
struct AcwrRow {
    #[tabled(rename = "Player")]
    player: String,
    #[tabled(rename = "ACWR")]
    ratio: String,
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "Status")]
    status: String,
}

#[derive(Tabled)]
struct OverviewRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Squad Avg")]
    average: String,
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "vs Target")]
    vs_target: String,
}

#[derive(Tabled)]
struct BenchmarkRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Match Avg")]
    match_average: String,
    #[tabled(rename = "Training Target")]
    target: String,
    #[tabled(rename = "Green")]
    green: String,
    #[tabled(rename = "Yellow")]
    yellow: String,
    #[tabled(rename = "Orange")]
    orange: String,
    #[tabled(rename = "Red")]
    red: String,
}

fn main() {
    if let Err(err) = run() {
        let message = match err.downcast_ref::<SquadLoadError>() {
            Some(squad_err) => {
                squad_err.log_event();
                squad_err.user_message()
            }
            None => {
                tracing::error!(error = %format!("{:#}", err), "Command failed");
                format!("{:#}", err)
            }
        };
        eprintln!("{} {}", "error:".red().bold(), message);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.logging.level = config.logging.level.raised_by(cli.verbose);
    init_logging(&config.logging)?;
    config.validate()?;

    let importer = CsvImporter::with_options(config.import.clone());
    let benchmarks = config.benchmark_set()?;

    match cli.command {
        Commands::Import { file } => {
            println!("{}", "Importing GPS export...".green().bold());
            let outcome = importer.import_file(&file)?;

            println!("  File: {}", file.display());
            println!("  Schema: {}", outcome.report.schema);
            for (from, to) in &outcome.report.renamed {
                println!("  {} {} → {}", "renamed".dimmed(), from, to);
            }
            for header in &outcome.report.unrecognized {
                println!("  {} {}", "unrecognized".yellow(), header);
            }

            let athletes = outcome
                .records
                .iter()
                .map(|r| r.athlete_id.as_str())
                .collect::<std::collections::BTreeSet<_>>()
                .len();
            println!(
                "{}",
                format!(
                    "✓ {} session records for {} athletes",
                    outcome.records.len(),
                    athletes
                )
                .green()
            );
        }

        Commands::Classify { metric, value } => {
            let classifier = ZoneClassifier::new(benchmarks);
            let zone = classifier.classify(value, metric);

            println!("{}", format!("{} = {}", metric, value).bold());
            println!("  Zone: {}", paint(zone, &zone.to_string()));
            if let Some(target) = classifier.training_target(metric) {
                println!("  Training target: {}", target.round_dp(0));
            }
            if let Some(pct) = classifier.percent_vs_target(value, metric) {
                println!("  vs target: {}", signed_percent(pct));
            }
        }

        Commands::Weekly {
            file,
            athlete,
            output,
        } => {
            let mut records = load_records(&importer, &file)?;
            if let Some(athlete) = athlete {
                records = RecordFilter::new().athlete(athlete).apply(&records);
            }

            let aggregates = WorkloadAggregator::aggregate(&records);
            let rows: Vec<WeeklyRow> = aggregates
                .iter()
                .map(|a| WeeklyRow {
                    player: a.athlete_id.clone(),
                    week: a.week.to_string(),
                    sessions: a.totals.session_count,
                    distance: a.totals.total_distance_m.round_dp(0).to_string(),
                    hsr: a.totals.hsr_distance_m.round_dp(0).to_string(),
                    sprint: a.totals.sprint_distance_m.round_dp(0).to_string(),
                    accels: a.totals.accel_count.to_string(),
                    decels: a.totals.decel_count.to_string(),
                    load: a.totals.player_load.round_dp(1).to_string(),
                })
                .collect();

            println!("{}", "📊 Weekly Load".blue().bold());
            println!("{}", Table::new(rows).with(Style::rounded()));

            if let Some(output) = output {
                let file = std::fs::File::create(&output)
                    .with_context(|| format!("Failed to create {}", output.display()))?;
                export::export_weekly(&aggregates, file)?;
                println!("{}", format!("✓ Wrote {}", output.display()).green());
            }
        }

        Commands::Acwr {
            file,
            chronic_weeks,
            acute_weeks,
            metric,
            json,
            csv,
        } => {
            let mut acwr_config = config.acwr.clone();
            if let Some(weeks) = chronic_weeks {
                acwr_config.chronic_weeks = weeks;
            }
            if let Some(weeks) = acute_weeks {
                acwr_config.acute_weeks = weeks;
            }
            if let Some(metric) = metric {
                acwr_config.load_metric = metric;
            }
            let calculator = AcwrCalculator::with_config(acwr_config)
                .map_err(SquadLoadError::from)?;

            let records = load_records(&importer, &file)?;
            let aggregates = WorkloadAggregator::aggregate(&records);
            let results = calculator.compute_squad(&aggregates);

            println!(
                "{}",
                format!(
                    "⚠️  Acute:Chronic Workload Ratio ({} weeks acute / {} chronic, {})",
                    calculator.config().acute_weeks,
                    calculator.config().chronic_weeks,
                    calculator.config().load_metric
                )
                .cyan()
                .bold()
            );

            let rows: Vec<AcwrRow> = results
                .iter()
                .map(|r| AcwrRow {
                    player: r.athlete_id.clone(),
                    ratio: r.ratio.map_or("-".to_string(), |v| v.round_dp(2).to_string()),
                    zone: r.zone.to_string(),
                    status: r.status.to_string(),
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));

            let summary = SquadAcwrSummary::from_results(&results);
            println!(
                "  {} {}   {} {}   {} {}   {} {}",
                "Optimal:".green(),
                summary.optimal,
                "Caution:".yellow(),
                summary.caution,
                "Risk:".red(),
                summary.risk,
                "No data:".dimmed(),
                summary.no_data
            );
            if let Some(mean) = summary.mean_ratio {
                println!("  Team avg ACWR: {}", mean.round_dp(2));
            }

            if let Some(path) = json {
                export::export_json(&results, &path)?;
                println!("{}", format!("✓ Wrote {}", path.display()).green());
            }
            if let Some(path) = csv {
                let file = std::fs::File::create(&path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                export::export_acwr(&results, file)?;
                println!("{}", format!("✓ Wrote {}", path.display()).green());
            }
        }

        Commands::Overview { file } => {
            let records = load_records(&importer, &file)?;
            let overview = TeamOverview::from_records(&records, &benchmarks)
                .ok_or_else(|| anyhow!("No sessions in {}", file.display()))?;

            println!(
                "{}",
                format!(
                    "📈 Team Overview: {} ({} athletes)",
                    overview.date, overview.athletes
                )
                .blue()
                .bold()
            );

            let rows: Vec<OverviewRow> = overview
                .metrics
                .iter()
                .map(|m| OverviewRow {
                    metric: m.metric.field().header().to_string(),
                    average: m.average.round_dp(0).to_string(),
                    zone: m.zone.to_string(),
                    vs_target: m
                        .percent_vs_target
                        .map_or("-".to_string(), signed_percent),
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));

            if let Some(speed) = overview.peak_max_speed {
                println!("  Peak speed: {} km/h", speed);
            }
        }

        Commands::Player { file, athlete } => {
            let records = load_records(&importer, &file)?;
            let profile = PlayerProfile::build(&records, &athlete)
                .ok_or_else(|| anyhow!("No sessions for {}", athlete))?;

            println!("{}", format!("👤 {}", profile.athlete_id).magenta().bold());
            println!(
                "  Position: {}",
                profile.position.map_or("-".to_string(), |p| p.to_string())
            );
            println!("  Sessions: {}", profile.sessions);
            println!("  Avg load: {} AU", profile.average_load.round_dp(0));

            for (date, distance, load) in &profile.trend {
                println!("  {}  {:>7} m  {:>7} AU", date, distance, load);
            }
        }

        Commands::Compare { file, athletes } => {
            let records = load_records(&importer, &file)?;
            let comparison = PlayerComparison::build(&records, &athletes);

            println!("{}", "👥 Player Comparison (% of best)".blue().bold());
            let mut builder = tabled::builder::Builder::default();
            let mut header = vec!["Player".to_string()];
            header.extend(MetricKey::ALL.iter().map(|m| m.key().to_string()));
            builder.push_record(header);
            for row in &comparison.rows {
                let mut cells = vec![row.athlete_id.clone()];
                cells.extend(MetricKey::ALL.iter().map(|m| {
                    row.normalized
                        .get(m)
                        .map_or("-".to_string(), |v| v.round_dp(0).to_string())
                }));
                builder.push_record(cells);
            }
            println!("{}", builder.build().with(Style::rounded()));
        }

        Commands::Progression { file, metric } => {
            let records = load_records(&importer, &file)?;
            let progression = LoadProgression::from_records(&records, metric);

            println!(
                "{}",
                format!("📊 Weekly {} (target {})", metric, progression.target.round_dp(0))
                    .blue()
                    .bold()
            );
            for (week, value) in &progression.weeks {
                let line = format!("  {}  {}", week, value.round_dp(0));
                if *value >= progression.target {
                    println!("{}", line.green());
                } else {
                    println!("{}", line);
                }
            }
        }

        Commands::Export {
            file,
            output,
            columns,
            from,
            to,
            athlete,
            position,
            session_type,
        } => {
            let records = load_records(&importer, &file)?;

            let mut filter = RecordFilter::new();
            if from.is_some() || to.is_some() {
                filter = filter.between(from, to);
            }
            if let Some(athlete) = athlete {
                filter = filter.athlete(athlete);
            }
            if let Some(position) = position {
                filter = filter.position(position);
            }
            if let Some(session_type) = session_type {
                filter = filter.session_type(session_type);
            }
            let selected = filter.apply(&records);

            let columns = match columns {
                Some(list) => parse_columns(&list)?,
                None => config.export.columns()?,
            };

            println!("{}", "Exporting session records...".yellow().bold());
            match ExportFormat::from_path(&output)? {
                ExportFormat::Csv => {
                    export::export_records_to_path(&selected, &columns, &output)?;
                }
                ExportFormat::Json => {
                    let mut newest_first = selected.clone();
                    newest_first.sort_by(|a, b| b.date.cmp(&a.date));
                    export::export_json(&newest_first, &output)?;
                }
            }
            println!(
                "{}",
                format!(
                    "✓ Exported {} of {} records to {}",
                    selected.len(),
                    records.len(),
                    output.display()
                )
                .yellow()
            );
        }

        Commands::Generate {
            output,
            athletes,
            weeks,
            seed,
        } => {
            let mut fixture_config = config.fixtures.clone();
            if let Some(athletes) = athletes {
                fixture_config.athletes = athletes;
            }
            if let Some(weeks) = weeks {
                fixture_config.weeks = weeks;
            }
            if let Some(seed) = seed {
                fixture_config.seed = seed;
            }

            let records = FixtureGenerator::with_config(fixture_config).generate_seeded();
            let columns = config.export.columns()?;
            export::export_records_to_path(&records, &columns, &output)?;

            println!(
                "{}",
                format!("✓ Generated {} sessions into {}", records.len(), output.display())
                    .green()
            );
        }

        Commands::Benchmarks => {
            println!("{}", format!("📚 Benchmarks: {}", benchmarks.id()).bold());
            let rows: Vec<BenchmarkRow> = benchmarks
                .metrics
                .iter()
                .map(|(metric, spec)| BenchmarkRow {
                    metric: metric.key().to_string(),
                    unit: spec.unit.to_string(),
                    match_average: spec.match_average.to_string(),
                    target: spec.training_target().round_dp(0).to_string(),
                    green: format!("{}-{}", spec.green.low, spec.green.high),
                    yellow: format!("{}-{}", spec.yellow.low, spec.yellow.high),
                    orange: format!("{}-{}", spec.orange.low, spec.orange.high),
                    red: format!("<{} / >{}", spec.red_low, spec.red_high),
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
        }
    }

    Ok(())
}

fn load_records(importer: &CsvImporter, file: &Path) -> Result<Vec<SessionRecord>> {
    Ok(importer.import_file(file)?.records)
}

fn paint(zone: Zone, text: &str) -> ColoredString {
    match zone {
        Zone::Green => text.green(),
        Zone::Yellow => text.yellow(),
        Zone::Orange => text.truecolor(255, 165, 0),
        Zone::Red => text.red(),
        Zone::Gray => text.dimmed(),
    }
}

fn signed_percent(pct: Decimal) -> String {
    let rounded = pct.round_dp(1);
    if rounded.is_sign_negative() {
        format!("{}%", rounded)
    } else {
        format!("+{}%", rounded)
    }
}

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;

use c2_score_tracker::cohort::build_cohort;
use c2_score_tracker::import::{enrich_all, load_entries};
use c2_score_tracker::models::FlaggedStudent;
use c2_score_tracker::scoring::{
    calculate_overall_score, estimate_scale_score, get_overall_band, scale_scores, Band,
    OverallResult, RawMarks, ScaleScoreMap, SkillComponent,
};
use c2_score_tracker::validation::validate_raw_mark;
use c2_score_tracker::{report, seed, telemetry};

#[derive(Parser)]
#[command(name = "c2-score-tracker")]
#[command(about = "C2 Proficiency score estimator and progress tracker", long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, env = "C2_LOG_LEVEL", default_value = telemetry::DEFAULT_LOG_LEVEL)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one raw paper mark to a scale score
    Convert {
        #[arg(long)]
        component: SkillComponent,
        #[arg(long)]
        raw: f64,
    },
    /// Estimate scale scores, overall and band for one exam
    Estimate {
        #[arg(long)]
        reading: Option<f64>,
        #[arg(long)]
        use_of_english: Option<f64>,
        #[arg(long)]
        writing: Option<f64>,
        #[arg(long)]
        listening: Option<f64>,
        #[arg(long)]
        speaking: Option<f64>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List students needing attention, most severe first
    Attention {
        #[arg(long, env = "C2_SCORES_CSV")]
        csv: PathBuf,
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Generate a markdown progress report
    Report {
        #[arg(long, env = "C2_SCORES_CSV")]
        csv: PathBuf,
        #[arg(long)]
        label: Option<String>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Write a sample score CSV
    Seed {
        #[arg(long, default_value = "scores.csv")]
        out: PathBuf,
    },
}

#[derive(Serialize)]
struct Estimate<'a> {
    scale_scores: &'a ScaleScoreMap,
    overall: OverallResult,
    band: &'static Band,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init(&cli.log_level).context("failed to initialise logging")?;

    match cli.command {
        Commands::Convert { component, raw } => {
            let raw = validate_raw_mark(component, raw)?;
            let scale = estimate_scale_score(component, raw);
            println!("{} raw {} -> scale {}", component.label(), raw, scale);
        }
        Commands::Estimate {
            reading,
            use_of_english,
            writing,
            listening,
            speaking,
            format,
        } => {
            let mut raw_marks = RawMarks::new();
            for (component, value) in [
                (SkillComponent::Reading, reading),
                (SkillComponent::UseOfEnglish, use_of_english),
                (SkillComponent::Writing, writing),
                (SkillComponent::Listening, listening),
                (SkillComponent::Speaking, speaking),
            ] {
                if let Some(value) = value {
                    raw_marks.insert(component, validate_raw_mark(component, value)?);
                }
            }

            let scores = scale_scores(&raw_marks);
            let overall = calculate_overall_score(&scores);
            let band = get_overall_band(overall.overall);

            match format {
                OutputFormat::Json => {
                    let estimate = Estimate {
                        scale_scores: &scores,
                        overall,
                        band,
                    };
                    println!("{}", serde_json::to_string_pretty(&estimate)?);
                }
                OutputFormat::Text => {
                    for (component, scale) in scores.iter() {
                        println!("{}: {}", component.label(), scale);
                    }
                    println!(
                        "Overall: {} ({} of 5 skills{})",
                        overall.overall,
                        overall.included_count,
                        if overall.is_complete { "" } else { ", incomplete" }
                    );
                    println!(
                        "Band: {} (CEFR {}, certificate: {})",
                        band.label,
                        band.cefr,
                        if band.certificate_awarded { "yes" } else { "no" }
                    );
                }
            }
        }
        Commands::Attention { csv, limit, format } => {
            let entries = load_entries(&csv)
                .with_context(|| format!("failed to load scores from {}", csv.display()))?;
            let cohort = build_cohort(enrich_all(&entries));
            let flagged: Vec<FlaggedStudent> = cohort.flagged().into_iter().take(limit).collect();
            info!(students = cohort.students.len(), flagged = flagged.len(), "attention computed");

            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&flagged)?);
                }
                OutputFormat::Text => {
                    if flagged.is_empty() {
                        println!("Every student is on track.");
                        return Ok(());
                    }

                    println!("Students needing attention:");
                    for student in flagged.iter() {
                        println!(
                            "- {} ({}) [{}] {} (last exam {})",
                            student.student_name,
                            student.student_id,
                            student.flag.reason.label(),
                            student.flag.detail,
                            student.latest_exam
                        );
                    }
                }
            }
        }
        Commands::Report { csv, label, out } => {
            let entries = load_entries(&csv)
                .with_context(|| format!("failed to load scores from {}", csv.display()))?;
            let cohort = build_cohort(enrich_all(&entries));
            let report = report::build_report(label.as_deref(), &cohort);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Seed { out } => {
            let written = seed::write_seed_csv(&out)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Wrote {written} sample entries to {}.", out.display());
        }
    }

    Ok(())
}

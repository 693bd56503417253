//! Leadform CLI - drive the lead-intake form from the command line
//!
//! # Commands
//!
//! ```bash
//! leadform check form.json                               # Validate a form definition
//! leadform submit form.json --field company=Acme \
//!     --select services=Design,Other --file brief.pdf     # Submit like the browser would
//! leadform submit form.json ... --dry-run                 # Print the payload instead
//! leadform format-size 1536                               # 1.5 KB
//! ```
//!
//! The endpoint, file field and total size cap can be overridden with
//! `LEADFORM_ENDPOINT`, `LEADFORM_FILE_FIELD` and `LEADFORM_MAX_TOTAL_SIZE`
//! (a `.env` file is loaded if present).

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use leadform::{
    format_bytes, Abort, AttachedFile, DropdownGroup, ErrorState, FormDefinition, FormValidator,
    FormValues, FormView, HttpTransport, LeadFormError, LeadFormResult, Part, StagingSet,
    SubmitController, SubmitOutcome,
};

#[derive(Parser)]
#[command(name = "leadform")]
#[command(about = "Validate and submit the lead-intake form", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a form definition and list its fields
    Check {
        /// Form definition (JSON)
        definition: PathBuf,
    },

    /// Validate the given values and post them to the endpoint
    Submit {
        /// Form definition (JSON)
        definition: PathBuf,

        /// Standard field value, as name=value (repeatable)
        #[arg(short, long = "field", value_name = "NAME=VALUE")]
        fields: Vec<String>,

        /// Multi-select values, as name=value1,value2 (repeatable)
        #[arg(short, long = "select", value_name = "NAME=VALUES")]
        selects: Vec<String>,

        /// File to attach (repeatable)
        #[arg(long = "file", value_name = "PATH")]
        files: Vec<PathBuf>,

        /// Print the payload instead of sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Print a byte count in human-readable form
    FormatSize {
        bytes: u64,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { definition } => cmd_check(&definition).await,

        Commands::Submit {
            definition,
            fields,
            selects,
            files,
            dry_run,
        } => cmd_submit(&definition, &fields, &selects, &files, dry_run).await,

        Commands::FormatSize { bytes } => {
            println!("{}", format_bytes(bytes));
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn load_definition(path: &Path) -> LeadFormResult<FormDefinition> {
    let json = tokio::fs::read_to_string(path).await?;
    let mut definition = FormDefinition::from_json_str(&json)?;
    definition.apply_env()?;
    Ok(definition)
}

async fn cmd_check(path: &Path) -> LeadFormResult<()> {
    eprintln!("📄 Checking: {}", path.display());
    let definition = load_definition(path).await?;
    FormValidator::from_definition(&definition)?;

    eprintln!("   Endpoint: {}", definition.endpoint);
    eprintln!("   File field: {}", definition.file_field);
    eprintln!(
        "   Attachments: {} total{}{}",
        format_bytes(definition.limits.max_total_size),
        definition
            .limits
            .max_file_size
            .map(|s| format!(", {} each", format_bytes(s)))
            .unwrap_or_default(),
        definition
            .limits
            .max_files
            .map(|n| format!(", up to {n} files"))
            .unwrap_or_default(),
    );
    eprintln!("   Types: {}", definition.limits.allowed_types.join(", "));

    for field in &definition.fields {
        let marker = if field.required { "*" } else { " " };
        eprintln!("   {} {} ({})", marker, field.name, field.input.html_type());
    }
    for select in DropdownGroup::from_specs(&definition.selects).widgets() {
        let marker = if select.required() { "*" } else { " " };
        let options: Vec<&str> = select.options().iter().map(|o| o.label.as_str()).collect();
        eprintln!("   {} {} [{}]", marker, select.name(), options.join(", "));
    }

    eprintln!("✅ Definition is valid");
    Ok(())
}

async fn cmd_submit(
    path: &Path,
    fields: &[String],
    selects: &[String],
    files: &[PathBuf],
    dry_run: bool,
) -> LeadFormResult<()> {
    let definition = load_definition(path).await?;
    let validator = FormValidator::from_definition(&definition)?;

    let mut values = FormValues::new();
    for assignment in fields {
        let (name, value) = parse_assignment(assignment)?;
        values.set(name, value);
    }

    let mut dropdowns = DropdownGroup::from_specs(&definition.selects);
    for assignment in selects {
        let (name, list) = parse_assignment(assignment)?;
        let select = dropdowns
            .get_mut(&name)
            .ok_or_else(|| LeadFormError::Argument(format!("unknown multi-select '{name}'")))?;
        for value in list.split(',').map(str::trim).filter(|v| !v.is_empty()) {
            if !select.options().iter().any(|o| o.value == value) {
                return Err(LeadFormError::Argument(format!(
                    "'{value}' is not an option of '{name}'"
                )));
            }
            select.set_selected(value, true);
        }
    }

    let mut staging = StagingSet::new(definition.limits.clone());
    let candidates = read_files(files).await?;
    let report = staging.add(candidates);
    for message in report.messages(staging.limits()) {
        eprintln!("⚠️  {}", message);
    }
    eprintln!("📎 {}", staging.snapshot().summary());

    let form = FormView {
        definition: &definition,
        validator: &validator,
        values: &values,
        dropdowns: &dropdowns,
        staging: &staging,
    };
    let mut errors = ErrorState::default();
    let mut controller = SubmitController::new();

    if dry_run {
        let payload = controller.prepare(&form, &mut errors).map_err(abort_error)?;
        for part in payload.parts() {
            match part {
                Part::Text { name, value } => println!("{name} = {value}"),
                Part::File { name, file } => println!(
                    "{name} <- {} ({}, {})",
                    file.name,
                    file.media_type,
                    format_bytes(file.size)
                ),
            }
        }
        return Ok(());
    }

    eprintln!("📤 Submitting to {}", definition.endpoint);
    match controller.submit(&form, &mut errors, &HttpTransport::new()).await {
        SubmitOutcome::Redirect(redirect) => {
            eprintln!("✅ Submitted");
            println!("{}", redirect.target);
            Ok(())
        }
        SubmitOutcome::Failed(error) => Err(error.into()),
        SubmitOutcome::Aborted(abort) => Err(abort_error(abort)),
    }
}

fn abort_error(abort: Abort) -> LeadFormError {
    match abort {
        Abort::Invalid(report) => {
            for (name, error) in &report.invalid {
                eprintln!("   - {}: {}", name, error);
            }
            LeadFormError::Invalid(report.invalid_names())
        }
        Abort::FileLimits => LeadFormError::FileLimits,
        Abort::Busy => LeadFormError::Argument("a submission is already running".into()),
    }
}

/// Split `name=value`. The value may be empty or contain `=`.
fn parse_assignment(raw: &str) -> LeadFormResult<(String, String)> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(LeadFormError::Argument(format!("expected NAME=VALUE, got '{raw}'"))),
    }
}

/// Read files from disk as staging candidates, guessing media types from
/// their extensions.
async fn read_files(paths: &[PathBuf]) -> LeadFormResult<Vec<AttachedFile<Vec<u8>>>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let media_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();
        files.push(AttachedFile::new(name, bytes.len() as u64, media_type, bytes));
    }
    Ok(files)
}

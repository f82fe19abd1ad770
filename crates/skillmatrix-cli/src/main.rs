//! Skillmatrix CLI
//!
//! Terminal front-end for the skills matrix.
//!
//! # Usage
//! ```bash
//! skillmatrix [--config skillmatrix.toml] [--data .skillmatrix/matrix.db] [--backend sqlite] <COMMAND>
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use skillmatrix_core::storage::SqliteKvStore;
use skillmatrix_core::{
    CollaboratorForm, CollaboratorId, CollaboratorPatch, EntityKind, MatrixConfig, MatrixError,
    MatrixStore, PhotoInput, Rating, SkillCategory, SkillForm, SkillId, SkillPatch,
    StorageBackendKind, TeamFilter, TeamForm, TeamId, ValidationError,
};

mod output;

/// Config file picked up from the working directory when none is given
const DEFAULT_CONFIG_FILE: &str = "skillmatrix.toml";

/// Skillmatrix - collaborators, teams and skill ratings
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML, or JSON with a .json extension)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Database file or directory, overrides the configuration
    #[arg(short, long, value_name = "PATH", global = true)]
    data: Option<PathBuf>,

    /// Storage backend, overrides the configuration
    #[arg(long, value_enum, global = true)]
    backend: Option<BackendArg>,

    /// Output JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendArg {
    Sqlite,
    JsonDir,
    Memory,
}

impl From<BackendArg> for StorageBackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Sqlite => StorageBackendKind::Sqlite,
            BackendArg::JsonDir => StorageBackendKind::JsonDir,
            BackendArg::Memory => StorageBackendKind::Memory,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write the current state (the default seed on a fresh store) to storage
    Init,

    /// Manage collaborators
    #[command(subcommand)]
    Collaborator(CollaboratorCommand),

    /// Manage teams
    #[command(subcommand)]
    Team(TeamCommand),

    /// Manage skills
    #[command(subcommand)]
    Skill(SkillCommand),

    /// Set a collaborator's rating in a skill
    Rate {
        /// Collaborator id or name
        collaborator: String,
        /// Skill id or name
        skill: String,
        /// N/A or 1-5
        rating: Rating,
    },

    /// Move a rating one step along N/A, 1, 2, 3, 4, 5, N/A
    Bump {
        collaborator: String,
        skill: String,
    },

    /// Toggle the aptitude flag of an existing rating
    Apt {
        collaborator: String,
        skill: String,
    },

    /// Radar chart data for a collaborator
    Radar { collaborator: String },

    /// Aptitude and autonomy report
    Recognition {
        /// Restrict to one team (id or name)
        #[arg(long)]
        team: Option<String>,
    },

    /// Explain the rating scale and the skill categories
    Legend,

    /// Inspect or write the configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
enum CollaboratorCommand {
    /// Add a collaborator
    Add {
        name: String,
        /// Team id or name
        #[arg(short, long)]
        team: Option<String>,
        /// Image file embedded as the photo
        #[arg(long, value_name = "FILE", conflicts_with = "photo_url")]
        photo: Option<PathBuf>,
        /// Photo URL used as-is
        #[arg(long, value_name = "URL")]
        photo_url: Option<String>,
        /// Mark as the team's focal point
        #[arg(long)]
        focal: bool,
    },
    /// List collaborators
    List {
        /// Restrict to one team (id or name)
        #[arg(short, long)]
        team: Option<String>,
    },
    /// Show a collaborator's skill card
    Show { collaborator: String },
    /// Change a collaborator's name, team or photo
    Update {
        collaborator: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long)]
        team: Option<String>,
        #[arg(long, value_name = "FILE", conflicts_with = "photo_url")]
        photo: Option<PathBuf>,
        #[arg(long, value_name = "URL")]
        photo_url: Option<String>,
    },
    /// Remove a collaborator
    Remove { collaborator: String },
    /// Toggle the focal flag
    Focal { collaborator: String },
}

#[derive(Subcommand)]
enum TeamCommand {
    /// Add a team
    Add { name: String },
    /// List teams with their member counts
    List,
    /// Remove a team without members
    Remove { team: String },
}

#[derive(Subcommand)]
enum SkillCommand {
    /// Add a skill
    Add {
        name: String,
        /// knowledge, hard or soft
        #[arg(long)]
        category: Option<SkillCategory>,
    },
    /// List skills with their usage
    List,
    /// Rename or recategorize a skill
    Update {
        skill: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<SkillCategory>,
    },
    /// Remove a skill nobody is rated in
    Remove { skill: String },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Write the default configuration to a file
    Init {
        #[arg(default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<MatrixError>() {
            Some(matrix_err) if matrix_err.is_user_error() => {
                output::notify_error(matrix_err);
                ExitCode::from(2)
            }
            _ => {
                eprintln!("{} {:#}", "Error:".red().bold(), err);
                ExitCode::FAILURE
            }
        },
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve the configuration: file, then environment, then flags
fn load_config(cli: &Cli) -> anyhow::Result<MatrixConfig> {
    let explicit = cli
        .config
        .clone()
        .or_else(|| std::env::var_os("SKILLMATRIX_CONFIG").map(PathBuf::from));

    let mut config = match explicit {
        Some(path) => MatrixConfig::from_file(&path)
            .with_context(|| format!("Loading config {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            MatrixConfig::from_file(DEFAULT_CONFIG_FILE)?
        }
        None => MatrixConfig::default(),
    };

    if let Some(path) = std::env::var_os("SKILLMATRIX_DATA") {
        config = config.with_data_path(path);
    }
    if let Some(path) = &cli.data {
        config = config.with_data_path(path.clone());
    }
    if let Some(backend) = cli.backend {
        config = config.with_backend(backend.into());
    }
    tracing::debug!(
        "Storage: {} at {}",
        config.storage.backend,
        config.storage.path.display()
    );
    Ok(config)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let json = cli.json;

    // config commands must not touch storage
    if let Commands::Config(command) = &cli.command {
        return run_config(command, &config, json);
    }

    let store = MatrixStore::from_settings(&config.storage)?;

    match cli.command {
        Commands::Init => {
            store.flush()?;
            if !json {
                output::success(&format!(
                    "Initialized {} storage at {}",
                    store.backend_name(),
                    config.storage.path.display()
                ));
            }
            if matches!(config.storage.backend, StorageBackendKind::Sqlite) {
                let entries = SqliteKvStore::open(&config.storage.path)?.entries()?;
                output::entries(&entries, json)?;
            }
        }
        Commands::Collaborator(command) => run_collaborator(command, &store, &config, json)?,
        Commands::Team(command) => run_team(command, &store, json)?,
        Commands::Skill(command) => run_skill(command, &store, json)?,
        Commands::Rate {
            collaborator,
            skill,
            rating,
        } => {
            let collaborator = find_collaborator(&store, &collaborator)?;
            let skill = find_skill(&store, &skill)?;
            let entry = store.update_skill_rating(&collaborator, &skill, rating)?;
            output::rating_changed(&store, &collaborator, &entry, json)?;
        }
        Commands::Bump { collaborator, skill } => {
            let collaborator = find_collaborator(&store, &collaborator)?;
            let skill = find_skill(&store, &skill)?;
            let current = store
                .collaborator(&collaborator)
                .and_then(|c| c.rating_for(&skill).map(|r| r.rating))
                .unwrap_or_default();
            let entry = store.update_skill_rating(&collaborator, &skill, current.next())?;
            output::rating_changed(&store, &collaborator, &entry, json)?;
        }
        Commands::Apt { collaborator, skill } => {
            let collaborator = find_collaborator(&store, &collaborator)?;
            let skill = find_skill(&store, &skill)?;
            let is_apt = store.toggle_skill_aptitude(&collaborator, &skill)?;
            if json {
                output::print_json(&serde_json::json!({ "isApt": is_apt }))?;
            } else {
                let state = if is_apt { "apt".green() } else { "not apt".yellow() };
                output::success(&format!("{} is now {} in {}", collaborator, state, skill));
            }
        }
        Commands::Radar { collaborator } => {
            let collaborator = find_collaborator(&store, &collaborator)?;
            let points = store.radar_points(&collaborator)?;
            output::radar(&points, json)?;
        }
        Commands::Recognition { team } => {
            let filter = TeamFilter::from(team.map(|t| find_team(&store, &t)).transpose()?);
            let report = store.recognition_report(&filter, config.recognition);
            output::recognition(&store, &report, json)?;
        }
        Commands::Legend => output::legend(json)?,
        Commands::Config(_) => {}
    }

    Ok(())
}

fn run_collaborator(
    command: CollaboratorCommand,
    store: &MatrixStore,
    config: &MatrixConfig,
    json: bool,
) -> anyhow::Result<()> {
    match command {
        CollaboratorCommand::Add {
            name,
            team,
            photo,
            photo_url,
            focal,
        } => {
            let mut form = CollaboratorForm::new(name).photo(photo_input(photo, photo_url)?);
            if let Some(team) = team {
                form = form.team(find_team(store, &team)?);
            }
            let new = form
                .validate(&store.teams(), &config.avatar)
                .map_err(MatrixError::from)?
                .focal(focal);
            let collaborator = store.add_collaborator(new)?;
            if json {
                output::print_json(&collaborator)?;
            } else {
                output::success(&format!("Added {} ({})", collaborator.name, collaborator.id));
            }
        }
        CollaboratorCommand::List { team } => {
            let filter = TeamFilter::from(team.map(|t| find_team(store, &t)).transpose()?);
            output::collaborators(store, &store.collaborators_in(&filter), json)?;
        }
        CollaboratorCommand::Show { collaborator } => {
            let card = store.collaborator_card(&find_collaborator(store, &collaborator)?)?;
            output::card(&card, json)?;
        }
        CollaboratorCommand::Update {
            collaborator,
            name,
            team,
            photo,
            photo_url,
        } => {
            let id = find_collaborator(store, &collaborator)?;
            let mut patch = CollaboratorPatch::default();
            if let Some(name) = name {
                patch = patch.name(name);
            }
            if let Some(team) = team {
                patch = patch.team(find_team(store, &team)?);
            }
            if photo.is_some() || photo_url.is_some() {
                let current = store
                    .collaborator(&id)
                    .ok_or_else(|| MatrixError::not_found(EntityKind::Collaborator, id.as_str()))?;
                let display_name = patch.name.clone().unwrap_or(current.name);
                let resolved = photo_input(photo, photo_url)?
                    .resolve(&display_name, &config.avatar)
                    .map_err(MatrixError::from)?;
                patch = patch.photo(resolved);
            }
            if patch.is_empty() {
                output::warning("Nothing to update");
                return Ok(());
            }
            let updated = store.update_collaborator(&id, patch)?;
            if json {
                output::print_json(&updated)?;
            } else {
                output::success(&format!("Updated {} ({})", updated.name, updated.id));
            }
        }
        CollaboratorCommand::Remove { collaborator } => {
            match store.remove_collaborator(&find_collaborator(store, &collaborator)?)? {
                Some(removed) => output::success(&format!("Removed {}", removed.name)),
                None => output::warning(&format!("No collaborator matches '{}'", collaborator)),
            }
        }
        CollaboratorCommand::Focal { collaborator } => {
            let id = find_collaborator(store, &collaborator)?;
            let is_focal = store.toggle_focal(&id)?;
            if json {
                output::print_json(&serde_json::json!({ "isFocal": is_focal }))?;
            } else if is_focal {
                output::success(&format!("{} is now a focal point", id));
            } else {
                output::success(&format!("{} is no longer a focal point", id));
            }
        }
    }
    Ok(())
}

fn run_team(command: TeamCommand, store: &MatrixStore, json: bool) -> anyhow::Result<()> {
    match command {
        TeamCommand::Add { name } => {
            let new = TeamForm::new(name).validate().map_err(MatrixError::from)?;
            let team = store.add_team(new)?;
            if json {
                output::print_json(&team)?;
            } else {
                output::success(&format!("Added team {} ({})", team.name, team.id));
            }
        }
        TeamCommand::List => output::teams(store, json)?,
        TeamCommand::Remove { team } => {
            let removed = store.try_remove_team(&find_team(store, &team)?)?;
            output::success(&format!("Removed team {}", removed.name));
        }
    }
    Ok(())
}

fn run_skill(command: SkillCommand, store: &MatrixStore, json: bool) -> anyhow::Result<()> {
    match command {
        SkillCommand::Add { name, category } => {
            let new = SkillForm::new(name, category)
                .validate()
                .map_err(MatrixError::from)?;
            let skill = store.add_skill(new)?;
            if json {
                output::print_json(&skill)?;
            } else {
                output::success(&format!(
                    "Added {} {} ({})",
                    skill.category.label().to_lowercase(),
                    skill.name,
                    skill.id
                ));
            }
        }
        SkillCommand::List => output::skills(store, json)?,
        SkillCommand::Update {
            skill,
            name,
            category,
        } => {
            let patch = SkillPatch {
                name,
                category,
            };
            if patch.is_empty() {
                output::warning("Nothing to update");
                return Ok(());
            }
            let updated = store.update_skill(&find_skill(store, &skill)?, patch)?;
            if json {
                output::print_json(&updated)?;
            } else {
                output::success(&format!("Updated skill {} ({})", updated.name, updated.id));
            }
        }
        SkillCommand::Remove { skill } => {
            let removed = store.try_remove_skill(&find_skill(store, &skill)?)?;
            output::success(&format!("Removed skill {}", removed.name));
        }
    }
    Ok(())
}

fn run_config(command: &ConfigCommand, config: &MatrixConfig, json: bool) -> anyhow::Result<()> {
    match command {
        ConfigCommand::Show => {
            if json {
                output::print_json(config)?;
            } else {
                print!("{}", toml::to_string_pretty(config)?);
            }
        }
        ConfigCommand::Init { path, force } => {
            if path.exists() && !force {
                anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
            }
            MatrixConfig::default().to_file(path)?;
            output::success(&format!("Wrote default configuration to {}", path.display()));
        }
    }
    Ok(())
}

fn photo_input(photo: Option<PathBuf>, photo_url: Option<String>) -> anyhow::Result<PhotoInput> {
    Ok(match (photo, photo_url) {
        (Some(path), _) => PhotoInput::Upload(
            std::fs::read(&path).with_context(|| format!("Reading photo '{}'", path.display()))?,
        ),
        (None, Some(url)) => PhotoInput::Url(url),
        (None, None) => PhotoInput::None,
    })
}

/// Match an argument against ids first, then case-insensitive names.
/// Unmatched input is passed through so the store reports it as not found.
fn find_collaborator(store: &MatrixStore, arg: &str) -> Result<CollaboratorId, MatrixError> {
    let found = store.read(|state| {
        lookup(
            EntityKind::Collaborator,
            state.collaborators.iter().map(|c| (c.id.as_str(), c.name.as_str())),
            arg,
        )
    })?;
    Ok(found.map_or_else(|| CollaboratorId::from(arg), CollaboratorId::from))
}

fn find_team(store: &MatrixStore, arg: &str) -> Result<TeamId, MatrixError> {
    let found = store.read(|state| {
        lookup(
            EntityKind::Team,
            state.teams.iter().map(|t| (t.id.as_str(), t.name.as_str())),
            arg,
        )
    })?;
    Ok(found.map_or_else(|| TeamId::from(arg), TeamId::from))
}

fn find_skill(store: &MatrixStore, arg: &str) -> Result<SkillId, MatrixError> {
    let found = store.read(|state| {
        lookup(
            EntityKind::Skill,
            state.skills.iter().map(|s| (s.id.as_str(), s.name.as_str())),
            arg,
        )
    })?;
    Ok(found.map_or_else(|| SkillId::from(arg), SkillId::from))
}

/// An exact id wins. Otherwise a name must match exactly one entry.
fn lookup<'a>(
    kind: EntityKind,
    entries: impl Iterator<Item = (&'a str, &'a str)> + Clone,
    arg: &str,
) -> Result<Option<String>, ValidationError> {
    let arg = arg.trim();
    if let Some((id, _)) = entries.clone().find(|(id, _)| *id == arg) {
        return Ok(Some(id.to_string()));
    }
    let mut matches: Vec<String> = entries
        .filter(|(_, name)| name.eq_ignore_ascii_case(arg))
        .map(|(id, _)| id.to_string())
        .collect();
    match matches.len() {
        0 => Ok(None),
        1 => Ok(matches.pop()),
        _ => Err(ValidationError::AmbiguousName {
            kind,
            name: arg.to_string(),
            candidates: matches,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_rate() {
        let cli = Cli::parse_from(["skillmatrix", "--backend", "memory", "rate", "Ana", "Excel", "N/A"]);
        assert!(matches!(cli.backend, Some(BackendArg::Memory)));
        match cli.command {
            Commands::Rate { rating, .. } => assert_eq!(rating, Rating::NotApplicable),
            _ => panic!("expected rate"),
        }
        assert!(Cli::try_parse_from(["skillmatrix", "rate", "Ana", "Excel", "6"]).is_err());
    }

    #[test]
    fn test_lookup_prefers_ids() {
        let entries = vec![("team1", "CIT"), ("team2", "team1")];
        let find = |arg| lookup(EntityKind::Team, entries.iter().copied(), arg).unwrap();
        assert_eq!(find("team1").as_deref(), Some("team1"));
        assert_eq!(find("cit").as_deref(), Some("team1"));
        assert_eq!(find("nope"), None);
    }

    #[test]
    fn test_lookup_rejects_shared_names() {
        let entries = vec![("collaborator-a", "Ana"), ("collaborator-b", "ana"), ("collaborator-c", "Bia")];
        let err = lookup(EntityKind::Collaborator, entries.iter().copied(), "ANA").unwrap_err();
        assert_eq!(
            err,
            ValidationError::AmbiguousName {
                kind: EntityKind::Collaborator,
                name: "ANA".to_string(),
                candidates: vec!["collaborator-a".to_string(), "collaborator-b".to_string()],
            }
        );
        assert!(err.to_string().contains("collaborator-a, collaborator-b"));

        // An id still resolves when names collide
        let found = lookup(EntityKind::Collaborator, entries.iter().copied(), "collaborator-b");
        assert_eq!(found.unwrap().as_deref(), Some("collaborator-b"));
    }

    #[test]
    fn test_find_collaborator_with_duplicate_names() {
        let store = MatrixStore::open(skillmatrix_core::storage::MemoryStore::new()).unwrap();
        let first = store
            .add_collaborator(skillmatrix_core::NewCollaborator::new("Ana", "", "team1"))
            .unwrap();
        assert_eq!(find_collaborator(&store, "ana").unwrap(), first.id);

        store
            .add_collaborator(skillmatrix_core::NewCollaborator::new("Ana", "", "team2"))
            .unwrap();
        let err = find_collaborator(&store, "ana").unwrap_err();
        assert!(err.is_user_error());
        assert!(err.to_string().contains(first.id.as_str()));
        assert_eq!(store.collaborators().len(), 2);
    }

    #[test]
    fn test_photo_file_is_uploaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("avatar.png");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR").unwrap();

        let input = photo_input(Some(path), None).unwrap();
        assert!(matches!(&input, PhotoInput::Upload(bytes) if bytes.starts_with(b"\x89PNG")));
        let err = photo_input(Some(dir.path().join("missing.png")), None).unwrap_err();
        assert!(format!("{:#}", err).contains("missing.png"));
        assert_eq!(photo_input(None, None).unwrap(), PhotoInput::None);
    }
}

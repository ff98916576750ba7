use std::fmt;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::credentials::CredentialStore;
use crate::error::PipelineError;
use crate::filename_parser::{self, ParsedFileInfo};
use crate::metadata::{MediaDescriptor, MediaKind, MetadataProvider};
use crate::prompt::Prompt;
use crate::regex_synth::{self, BatchRegexRule, RegexRule};
use crate::scanner;

/// Everything printed after a successful run.
#[derive(Debug, Clone)]
pub struct Report {
    pub kind: MediaKind,
    pub files: Vec<PathBuf>,
    pub descriptor: MediaDescriptor,
    pub original_name: String,
    pub normalized_name: String,
    pub rule: RegexRule,
    pub batch: Option<BatchRegexRule>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Regex rename rule ===")?;
        writeln!(f, "Original file name:\n{}", self.original_name)?;
        writeln!(f, "\nRenamed to:\n{}", self.normalized_name)?;
        writeln!(f, "\nFind pattern:\n{}", self.rule.find_pattern)?;
        writeln!(f, "Replace template:\n{}", self.rule.replace_template)?;

        if let Some(batch) = &self.batch {
            writeln!(f, "\n=== Batch regex rename rule ===")?;
            writeln!(f, "Find pattern:\n{}", batch.find_pattern)?;
            writeln!(f, "Replace template:\n{}", batch.replace_template)?;
            writeln!(f, "\nUsage:")?;
            writeln!(f, "1. The batch find pattern matches every episode file of this title in the directory")?;
            writeln!(f, "2. \\1 is the season number, \\2 is the episode number")?;
            writeln!(f, "3. The video quality keeps the format found in the original files")?;
        }
        Ok(())
    }
}

fn ask_required<P: Prompt>(prompt: &mut P, question: &str, field: &'static str) -> Result<String, PipelineError> {
    let answer = prompt.ask(question)?;
    if answer.is_empty() {
        return Err(PipelineError::EmptyInput(field));
    }
    Ok(answer)
}

// Empty answers fall back to `01`.
fn ask_two_digits<P: Prompt>(prompt: &mut P, question: &str, field: &'static str) -> Result<String, PipelineError> {
    let answer = prompt.ask(question)?;
    if answer.is_empty() {
        return Ok("01".to_string());
    }
    match answer.parse::<u32>() {
        Ok(n) if n > 0 => Ok(filename_parser::pad_two_digits(&n.to_string())),
        _ => Err(PipelineError::InvalidNumber { field, value: answer }),
    }
}

/// Fills season, episode and quality the parser could not find.
pub fn resolve_missing<P: Prompt>(
    prompt: &mut P,
    mut parsed: ParsedFileInfo,
    kind: MediaKind,
) -> Result<ParsedFileInfo, PipelineError> {
    if kind == MediaKind::Tv {
        if parsed.season.is_none() {
            parsed.season = Some(ask_two_digits(
                prompt,
                "Season not found in file name, enter it manually (default 01): ",
                "season",
            )?);
        }
        if parsed.episode.is_none() {
            parsed.episode = Some(ask_two_digits(
                prompt,
                "Episode not found in file name, enter it manually (default 01): ",
                "episode",
            )?);
        }
    }

    if parsed.video_quality.is_empty() {
        let answer = prompt.ask("Video quality not found in file name, enter it manually (e.g. 1080P): ")?;
        parsed.video_quality = answer
            .to_uppercase()
            .split('.')
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect();
    }

    Ok(parsed)
}

fn resolve_api_key<P: Prompt, C: CredentialStore>(prompt: &mut P, store: &C) -> Result<String, PipelineError> {
    match store.load() {
        Ok(Some(key)) => return Ok(key),
        Ok(None) => {}
        Err(err) => warn!(error = %err, "could not read stored credentials"),
    }

    let key = ask_required(prompt, "Enter TMDB API key: ", "API key")?;
    if let Err(err) = store.save(&key) {
        warn!(error = %err, "could not save credentials");
        prompt.say(&format!("Warning: could not save config file: {}", err))?;
    }
    Ok(key)
}

/// Runs the whole interactive flow: scan, ask, look up, synthesize.
///
/// `directory` pre-answers the directory question. Nothing is fetched
/// from the provider unless at least one file matched.
pub async fn run<P, C, M>(
    prompt: &mut P,
    store: &C,
    provider: &M,
    directory: Option<PathBuf>,
) -> Result<Report, PipelineError>
where
    P: Prompt,
    C: CredentialStore,
    M: MetadataProvider,
{
    let dir = match directory {
        Some(dir) => dir,
        None => {
            let answer = prompt.ask("Enter the directory of the video files (press Enter for current directory): ")?;
            if answer.is_empty() { PathBuf::from(".") } else { PathBuf::from(answer) }
        }
    };

    let fixed_title = ask_required(prompt, "Enter the fixed part of the title to match: ", "title")?;

    let files = scanner::find_matching_files(&dir, &fixed_title)?;
    if files.is_empty() {
        return Err(PipelineError::NoMatchingFiles { dir, title: fixed_title });
    }
    info!(count = files.len(), "found matching files");

    prompt.say("\nSelect the media type:\n1. Movie\n2. TV show")?;
    let choice = prompt.ask("Enter option (1 or 2): ")?;
    let kind = MediaKind::from_choice(&choice).ok_or(PipelineError::InvalidMediaKind(choice))?;

    let id_answer = prompt.ask("Enter TMDB ID: ")?;
    let tmdb_id = match id_answer.parse::<u64>() {
        Ok(id) if id > 0 => id,
        _ => return Err(PipelineError::InvalidTmdbId(id_answer)),
    };

    let season_offset = if kind == MediaKind::Tv {
        let answer = prompt.ask("Season offset (press Enter for 0): ")?;
        if answer.is_empty() {
            0
        } else {
            answer
                .parse::<i32>()
                .map_err(|_| PipelineError::InvalidSeasonOffset(answer.clone()))?
        }
    } else {
        0
    };

    let api_key = resolve_api_key(prompt, store)?;

    let original_name = scanner::file_name_of(&files[0]);
    let parsed = resolve_missing(prompt, filename_parser::parse(&original_name), kind)?;
    let parsed = parsed.with_season_offset(season_offset)?;

    let descriptor = provider.lookup(kind, tmdb_id, &api_key).await?;
    info!(title = %descriptor.title, year = %descriptor.year, "provider lookup succeeded");

    let rule = regex_synth::synthesize(
        &original_name,
        Some(&fixed_title),
        &parsed,
        &descriptor,
        kind,
        season_offset,
    );
    let normalized_name = regex_synth::normalized_name(&parsed, &descriptor, kind);

    let batch = if kind == MediaKind::Tv {
        let names: Vec<String> = files.iter().map(|path| scanner::file_name_of(path)).collect();
        let season_override = if season_offset != 0 { parsed.season.as_deref() } else { None };
        regex_synth::synthesize_batch(&names, &fixed_title, &descriptor, season_override)
    } else {
        None
    };

    Ok(Report {
        kind,
        files,
        descriptor,
        original_name,
        normalized_name,
        rule,
        batch,
    })
}

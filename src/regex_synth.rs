use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::filename_parser::{self, ParsedFileInfo};
use crate::metadata::{MediaDescriptor, MediaKind};

/// Find/replace pair for a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexRule {
    pub find_pattern: String,
    pub replace_template: String,
}

/// Find/replace pair generalized over every file sharing a fixed title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRegexRule {
    pub find_pattern: String,
    pub replace_template: String,
}

static SEASON_EPISODE_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([Ss])([0-9]+)([Ee])([0-9]+)").expect("invalid season/episode span regex")
});

/// Capture group wide enough for the literal digits it replaces.
fn capture_group(literal: &str) -> String {
    digit_group(literal.len())
}

fn digit_group(width: usize) -> String {
    format!(r"(\d{{1,{}}})", width.max(2))
}

// Joins name segments with `.`, skipping empty ones.
fn join_segments(segments: &[&str]) -> String {
    segments
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(".")
}

// `<title>.<year>[.<numbering>].<quality>.{tmdbid=<id>}`
fn target_name(descriptor: &MediaDescriptor, numbering: &str, quality: &str) -> String {
    let tag = format!("{{tmdbid={}}}", descriptor.id);
    join_segments(&[&descriptor.title, &descriptor.year, numbering, quality, &tag])
}

/// The target filename the rule produces for this file.
pub fn normalized_name(parsed: &ParsedFileInfo, descriptor: &MediaDescriptor, kind: MediaKind) -> String {
    let quality = parsed.quality_label().to_lowercase();
    match kind {
        MediaKind::Movie => target_name(descriptor, "", &quality),
        MediaKind::Tv => {
            let season = parsed.season.as_deref().unwrap_or(filename_parser::DEFAULT_SEASON);
            let episode = parsed.episode.as_deref().unwrap_or("01");
            target_name(descriptor, &format!("S{}E{}", season, episode), &quality)
        }
    }
}

/// Escapes `text`, rewriting each span into a capture group. Spans are
/// applied left to right on the unescaped text so equal digits never collide.
fn escape_with_groups(text: &str, spans: &[Range<usize>]) -> String {
    let mut ordered: Vec<&Range<usize>> = spans.iter().collect();
    ordered.sort_by_key(|span| span.start);

    let mut out = String::new();
    let mut cursor = 0;
    for span in ordered {
        out.push_str(&regex::escape(&text[cursor..span.start]));
        out.push_str(&capture_group(&text[span.clone()]));
        cursor = span.end;
    }
    out.push_str(&regex::escape(&text[cursor..]));
    out
}

// Where `full_match` sits in `original_name`, preferring the parse offset.
fn locate_match(original_name: &str, parsed: &ParsedFileInfo) -> Option<usize> {
    if parsed.full_match.is_empty() {
        return None;
    }
    let at_offset = original_name
        .get(parsed.match_start..)
        .is_some_and(|rest| rest.starts_with(&parsed.full_match));
    if at_offset {
        Some(parsed.match_start)
    } else {
        original_name.find(&parsed.full_match)
    }
}

/// Builds the rename rule for one file.
///
/// `parsed.season` must already carry `season_offset` (see
/// [`ParsedFileInfo::with_season_offset`]); the offset itself only decides
/// whether the season stays a capture group. Movies get a fully literal
/// pattern. For TV the episode digits inside the matched token become a
/// capture group, and the season digits too when no offset is applied and
/// the season is not `01`.
pub fn synthesize(
    original_name: &str,
    fixed_title: Option<&str>,
    parsed: &ParsedFileInfo,
    descriptor: &MediaDescriptor,
    kind: MediaKind,
    season_offset: i32,
) -> RegexRule {
    if let Some(title) = fixed_title {
        if !original_name.to_lowercase().contains(&title.to_lowercase()) {
            warn!(original_name, title, "file name does not contain the fixed title");
        }
    }

    let quality = parsed.quality_label().to_lowercase();

    if kind == MediaKind::Movie {
        return RegexRule {
            find_pattern: regex::escape(original_name),
            replace_template: target_name(descriptor, "", &quality),
        };
    }

    let season = parsed.season.as_deref().unwrap_or(filename_parser::DEFAULT_SEASON);
    let episode = parsed.episode.as_deref().unwrap_or("01");

    let capture_season = season_offset == 0
        && parsed.season_span.is_some()
        && season != filename_parser::DEFAULT_SEASON;

    let (find_pattern, numbering) = match (locate_match(original_name, parsed), &parsed.episode_span) {
        (Some(start), Some(episode_span)) => {
            let end = start + parsed.full_match.len();
            let mut spans = vec![episode_span.clone()];
            let numbering = match (&parsed.season_span, capture_season) {
                (Some(season_span), true) => {
                    spans.push(season_span.clone());
                    r"S\1E\2".to_string()
                }
                _ => format!(r"S{}E\1", season),
            };
            let find = format!(
                "{}{}{}",
                regex::escape(&original_name[..start]),
                escape_with_groups(&parsed.full_match, &spans),
                regex::escape(&original_name[end..]),
            );
            (find, numbering)
        }
        _ => {
            // Season/episode came from manual input; nothing to capture.
            (regex::escape(original_name), format!("S{}E{}", season, episode))
        }
    };

    debug!(
        %find_pattern,
        %numbering,
        season = ?parsed.season_literal(),
        episode = ?parsed.episode_literal(),
        "synthesized tv rule"
    );
    RegexRule {
        find_pattern,
        replace_template: target_name(descriptor, &numbering, &quality),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrefixToken {
    Char(char),
    Digits,
}

// Collapses each run of ASCII digits into a single placeholder.
fn prefix_tokens(prefix: &str) -> Vec<PrefixToken> {
    let mut tokens = Vec::new();
    for ch in prefix.chars() {
        if ch.is_ascii_digit() {
            if tokens.last() != Some(&PrefixToken::Digits) {
                tokens.push(PrefixToken::Digits);
            }
        } else {
            tokens.push(PrefixToken::Char(ch));
        }
    }
    tokens
}

fn render_prefix(tokens: &[PrefixToken]) -> String {
    let mut out = String::new();
    let mut literal = String::new();
    for token in tokens {
        match token {
            PrefixToken::Char(ch) => literal.push(*ch),
            PrefixToken::Digits => {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                out.push_str(r"\d+");
            }
        }
    }
    out.push_str(&regex::escape(&literal));
    out
}

fn common_prefix_tokens(prefixes: &[&str]) -> Vec<PrefixToken> {
    let mut iter = prefixes.iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };

    let mut common = prefix_tokens(first);
    for prefix in iter {
        let other = prefix_tokens(prefix);
        let shared = common
            .iter()
            .zip(other.iter())
            .take_while(|(a, b)| a == b)
            .count();
        common.truncate(shared);
    }
    common
}

/// Longest shared start of all prefixes, with digit runs treated as equal
/// and rendered as `\d+`.
pub fn common_prefix_pattern(prefixes: &[&str]) -> String {
    render_prefix(&common_prefix_tokens(prefixes))
}

/// Builds one rule covering a whole season directory.
///
/// The reference file is the lexicographically first name, so the result does
/// not depend on directory walk order. Returns `None` when the fixed title is
/// missing from the reference file or no `S<n>E<n>` token follows it.
/// The title is matched case-insensitively, and the season/episode groups
/// are as wide as the longest number found across all files.
/// `season_override` writes a literal season (used with a season offset)
/// instead of the `\1` back-reference.
pub fn synthesize_batch<S: AsRef<str>>(
    files: &[S],
    fixed_title: &str,
    descriptor: &MediaDescriptor,
    season_override: Option<&str>,
) -> Option<BatchRegexRule> {
    if fixed_title.is_empty() {
        return None;
    }

    let mut names: Vec<&str> = files.iter().map(|f| f.as_ref()).collect();
    names.sort_unstable();
    let reference = *names.first()?;

    let title_re = Regex::new(&format!("(?i){}", regex::escape(fixed_title))).ok()?;
    let title_match = title_re.find(reference)?;

    let suffix = &reference[title_match.end()..];
    let caps = SEASON_EPISODE_SPAN.captures(suffix)?;
    let span = caps.get(0)?;
    let season_marker = caps.get(1)?.as_str();
    let mut season_width = caps.get(2)?.len();
    let episode_marker = caps.get(3)?.as_str();
    let mut episode_width = caps.get(4)?.len();

    // Suffix now starts at the season/episode token.
    let rest = &suffix[span.end()..];
    let quality = filename_parser::parse(reference).quality_label();
    let mut tail = regex::escape(rest);
    if !quality.is_empty() {
        if let Ok(quality_re) = Regex::new(&format!("(?i){}", regex::escape(&quality))) {
            if let Some(q) = quality_re.find(rest) {
                tail = format!("{}.*", regex::escape(&rest[..q.end()]));
            }
        }
    }

    let reference_prefix = &reference[..title_match.start()];
    let mut prefixes = vec![reference_prefix];
    for name in names.iter().skip(1) {
        let Some(m) = title_re.find(name) else {
            warn!(file = %name, fixed_title, "skipping file without fixed title");
            continue;
        };
        prefixes.push(&name[..m.start()]);
        if let Some(other) = SEASON_EPISODE_SPAN.captures(&name[m.end()..]) {
            season_width = season_width.max(other[2].len());
            episode_width = episode_width.max(other[4].len());
        }
    }

    let common = common_prefix_tokens(&prefixes);
    let mut prefix_pattern = render_prefix(&common);
    // Prefixes diverge before the title; skip whatever differs.
    if common.len() < prefix_tokens(reference_prefix).len() {
        prefix_pattern.push_str(".*?");
    }

    let find_pattern = format!(
        "{}(?i:{}).*?{}{}{}{}{}",
        prefix_pattern,
        regex::escape(title_match.as_str()),
        season_marker,
        digit_group(season_width),
        episode_marker,
        digit_group(episode_width),
        tail
    );

    let numbering = match season_override {
        Some(season) => format!(r"S{}E\2", season),
        None => r"S\1E\2".to_string(),
    };
    let replace_template = target_name(descriptor, &numbering, &quality.to_lowercase());

    debug!(%find_pattern, %replace_template, files = names.len(), "synthesized batch rule");
    Some(BatchRegexRule { find_pattern, replace_template })
}

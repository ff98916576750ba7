use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Season assumed when a filename only carries an episode number.
pub const DEFAULT_SEASON: &str = "01";

/// Resolution and dynamic-range markers kept in the normalized name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityTag {
    P1080,
    P720,
    P2160,
    K4,
    K8,
    P480,
    Hdr,
}

impl QualityTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTag::P1080 => "1080P",
            QualityTag::P720 => "720P",
            QualityTag::P2160 => "2160P",
            QualityTag::K4 => "4K",
            QualityTag::K8 => "8K",
            QualityTag::P480 => "480P",
            QualityTag::Hdr => "HDR",
        }
    }

    /// Maps a scanned token to a tag. Codec markers (HEVC, H265) and
    /// anything outside the vocabulary yield `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_uppercase().as_str() {
            "1080P" => Some(QualityTag::P1080),
            "720P" => Some(QualityTag::P720),
            "2160P" => Some(QualityTag::P2160),
            "4K" => Some(QualityTag::K4),
            "8K" => Some(QualityTag::K8),
            "480P" => Some(QualityTag::P480),
            "HDR" => Some(QualityTag::Hdr),
            _ => None,
        }
    }
}

/// Which of the ordered rules produced the season/episode match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    SeasonEpisode,
    ChineseSeasonEpisode,
    SeasonEpisodeWords,
    EpisodeMarker,
    ChineseEpisode,
    EpDot,
    EpisodeDot,
    EpUpper,
}

impl MatchRule {
    /// True for the episode-only rules, where the season was defaulted.
    pub fn is_episode_only(&self) -> bool {
        !matches!(
            self,
            MatchRule::SeasonEpisode | MatchRule::ChineseSeasonEpisode | MatchRule::SeasonEpisodeWords
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedFileInfo {
    /// Exact substring consumed by the rule that fired; empty when none did.
    pub full_match: String,
    /// Byte offset of `full_match` in the parsed name.
    pub match_start: usize,
    pub season: Option<String>,
    pub episode: Option<String>,
    /// Uppercased quality tags in order of appearance, codecs removed.
    pub video_quality: Vec<String>,
    pub rule: Option<MatchRule>,
    /// Span of the literal season digits inside `full_match`.
    pub season_span: Option<Range<usize>>,
    /// Span of the literal episode digits inside `full_match`.
    pub episode_span: Option<Range<usize>>,
}

impl ParsedFileInfo {
    /// Quality tags joined with `.`, e.g. `2160P.HDR`.
    pub fn quality_label(&self) -> String {
        self.video_quality.join(".")
    }

    /// Literal season digits as they appear in the filename.
    pub fn season_literal(&self) -> Option<&str> {
        self.season_span.clone().map(|span| &self.full_match[span])
    }

    /// Literal episode digits as they appear in the filename.
    pub fn episode_literal(&self) -> Option<&str> {
        self.episode_span.clone().map(|span| &self.full_match[span])
    }

    /// Shifts the season by `offset`. The result must stay positive; the
    /// returned info carries the adjusted two-digit season and unchanged spans.
    pub fn with_season_offset(&self, offset: i32) -> Result<ParsedFileInfo, SeasonOffsetError> {
        let mut adjusted = self.clone();
        if offset == 0 {
            return Ok(adjusted);
        }

        let current = self.season.as_deref().unwrap_or(DEFAULT_SEASON);
        let season: i64 = current
            .parse()
            .map_err(|_| SeasonOffsetError::NotNumeric(current.to_string()))?;
        let shifted = season + offset as i64;
        if shifted <= 0 {
            return Err(SeasonOffsetError::NonPositive { season: current.to_string(), offset });
        }

        adjusted.season = Some(pad_two_digits(&shifted.to_string()));
        Ok(adjusted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeasonOffsetError {
    #[error("season '{0}' is not a number")]
    NotNumeric(String),
    #[error("season {season} with offset {offset} would not be positive")]
    NonPositive { season: String, offset: i32 },
}

static QUALITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?-u:\b)(1080p|720p|2160p|4k|8k|480p|HDR|HEVC|H265)(?-u:\b)")
        .expect("invalid quality regex")
});

// Tried in order, first match wins.
static SEASON_EPISODE_RULES: LazyLock<Vec<(MatchRule, Regex)>> = LazyLock::new(|| {
    vec![
        (MatchRule::SeasonEpisode, r"[Ss]([0-9]{1,2})[Ee]([0-9]{1,3})"),
        (MatchRule::ChineseSeasonEpisode, r"第([0-9]{1,2})季.?第([0-9]{1,3})集"),
        (MatchRule::SeasonEpisodeWords, r"(?i)Season\s*([0-9]{1,2}).*?Episode\s*([0-9]{1,3})"),
    ]
    .into_iter()
    .map(|(rule, pattern)| (rule, Regex::new(pattern).expect("invalid season/episode regex")))
    .collect()
});

static EPISODE_ONLY_RULES: LazyLock<Vec<(MatchRule, Regex)>> = LazyLock::new(|| {
    vec![
        // E05 must not be the start of a longer number
        (MatchRule::EpisodeMarker, r"[Ee]([0-9]{1,3})(?:[^0-9]|$)"),
        (MatchRule::ChineseEpisode, r"第([0-9]{1,3})集"),
        (MatchRule::EpDot, r"[Ee]p\.?([0-9]{1,3})"),
        (MatchRule::EpisodeDot, r"[Ee]pisode\.?([0-9]{1,3})"),
        (MatchRule::EpUpper, r"EP([0-9]{1,3})"),
    ]
    .into_iter()
    .map(|(rule, pattern)| (rule, Regex::new(pattern).expect("invalid episode regex")))
    .collect()
});

/// Left-pads single digits with `0`; longer numbers are kept as-is.
pub fn pad_two_digits(num: &str) -> String {
    if num.len() == 1 {
        format!("0{}", num)
    } else {
        num.to_string()
    }
}

/// Collects quality tags in order of appearance. Duplicates are kept.
pub fn scan_quality(file_name: &str) -> Vec<String> {
    QUALITY_PATTERN
        .find_iter(file_name)
        .filter_map(|m| QualityTag::from_token(m.as_str()))
        .map(|tag| tag.as_str().to_string())
        .collect()
}

/// Extracts season, episode and quality from a filename. Never fails;
/// absent fields mean no rule matched.
pub fn parse(file_name: &str) -> ParsedFileInfo {
    let mut info = ParsedFileInfo {
        video_quality: scan_quality(file_name),
        ..Default::default()
    };

    for (rule, re) in SEASON_EPISODE_RULES.iter() {
        let Some(caps) = re.captures(file_name) else {
            continue;
        };
        let (Some(whole), Some(season), Some(episode)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };

        info.full_match = whole.as_str().to_string();
        info.match_start = whole.start();
        info.season = Some(pad_two_digits(season.as_str()));
        info.episode = Some(pad_two_digits(episode.as_str()));
        info.season_span = Some(season.start() - whole.start()..season.end() - whole.start());
        info.episode_span = Some(episode.start() - whole.start()..episode.end() - whole.start());
        info.rule = Some(*rule);
        debug!(?rule, matched = %info.full_match, "season/episode rule matched");
        return info;
    }

    for (rule, re) in EPISODE_ONLY_RULES.iter() {
        let Some(caps) = re.captures(file_name) else {
            continue;
        };
        let (Some(whole), Some(episode)) = (caps.get(0), caps.get(1)) else {
            continue;
        };

        info.full_match = whole.as_str().to_string();
        info.match_start = whole.start();
        info.season = Some(DEFAULT_SEASON.to_string());
        info.episode = Some(pad_two_digits(episode.as_str()));
        info.episode_span = Some(episode.start() - whole.start()..episode.end() - whole.start());
        info.rule = Some(*rule);
        debug!(?rule, matched = %info.full_match, "episode-only rule matched");
        return info;
    }

    debug!(file_name, "no season/episode rule matched");
    info
}

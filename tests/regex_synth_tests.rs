// Integration tests for the regex synthesizer module

use custom_recognition::filename_parser::parse;
use custom_recognition::metadata::{MediaDescriptor, MediaKind};
use custom_recognition::regex_synth::{common_prefix_pattern, normalized_name, synthesize, synthesize_batch};
use regex::Regex;

fn descriptor(title: &str, year: &str, id: u64) -> MediaDescriptor {
    MediaDescriptor {
        title: title.to_string(),
        year: year.to_string(),
        id,
    }
}

fn full_match_regex(find: &str) -> Regex {
    Regex::new(&format!("^{}$", find)).unwrap()
}

#[test]
fn test_movie_rule_is_fully_literal() {
    let name = "The.Matrix.1999.1080p.BluRay.x264";
    let parsed = parse(name);
    let rule = synthesize(name, Some("Matrix"), &parsed, &descriptor("黑客帝国", "1999", 603), MediaKind::Movie, 0);

    assert_eq!(rule.find_pattern, r"The\.Matrix\.1999\.1080p\.BluRay\.x264");
    assert_eq!(rule.replace_template, "黑客帝国.1999.1080p.{tmdbid=603}");
    assert!(full_match_regex(&rule.find_pattern).is_match(name));
}

#[test]
fn test_ep_form_defaults_to_season_one() {
    let name = "大宅门.Ep34.WEB-DL.4K.mp4";
    let parsed = parse(name);
    let rule = synthesize(name, Some("大宅门"), &parsed, &descriptor("大宅门", "2013", 42), MediaKind::Tv, 0);

    assert!(rule.find_pattern.contains(r"Ep(\d{1,2})"));
    assert_eq!(
        rule.find_pattern,
        format!(r"{}Ep(\d{{1,2}}){}", regex::escape("大宅门."), regex::escape(".WEB-DL.4K.mp4"))
    );
    assert!(rule.replace_template.contains(r"S01E\1"));
    assert_eq!(rule.replace_template, r"大宅门.2013.S01E\1.4k.{tmdbid=42}");

    let caps = full_match_regex(&rule.find_pattern).captures(name).unwrap();
    assert_eq!(&caps[1], "34");
}

#[test]
fn test_tv_captures_season_and_episode() {
    let name = "Show.S02E05.1080p.mkv";
    let parsed = parse(name);
    let rule = synthesize(name, None, &parsed, &descriptor("Title", "2020", 1), MediaKind::Tv, 0);

    assert_eq!(rule.find_pattern, r"Show\.S(\d{1,2})E(\d{1,2})\.1080p\.mkv");
    assert_eq!(rule.replace_template, r"Title.2020.S\1E\2.1080p.{tmdbid=1}");
}

#[test]
fn test_tv_season_one_stays_literal() {
    let name = "Show.S01E05.mkv";
    let parsed = parse(name);
    let rule = synthesize(name, None, &parsed, &descriptor("Title", "2020", 1), MediaKind::Tv, 0);

    assert_eq!(rule.find_pattern, r"Show\.S01E(\d{1,2})\.mkv");
    assert_eq!(rule.replace_template, r"Title.2020.S01E\1.{tmdbid=1}");
}

#[test]
fn test_equal_season_and_episode_digits() {
    let name = "Show.S05E05.mkv";
    let parsed = parse(name);
    let rule = synthesize(name, None, &parsed, &descriptor("Title", "2020", 1), MediaKind::Tv, 0);

    assert_eq!(rule.find_pattern, r"Show\.S(\d{1,2})E(\d{1,2})\.mkv");
    let caps = full_match_regex(&rule.find_pattern).captures(name).unwrap();
    assert_eq!((&caps[1], &caps[2]), ("05", "05"));
}

#[test]
fn test_season_offset_writes_literal_season() {
    let name = "Show.S02E07.720p.mkv";
    let parsed = parse(name).with_season_offset(1).unwrap();
    let rule = synthesize(name, None, &parsed, &descriptor("Title", "2020", 1), MediaKind::Tv, 1);

    assert_eq!(rule.find_pattern, r"Show\.S02E(\d{1,2})\.720p\.mkv");
    assert_eq!(rule.replace_template, r"Title.2020.S03E\1.720p.{tmdbid=1}");
}

#[test]
fn test_round_trip_reproduces_full_match() {
    let names = [
        "Show.S02E05.1080p.mkv",
        "[Grp] Show (2020) S03E11 [1080p].mkv",
        "大宅门第2季第10集.1080p.mp4",
        "Show season 4 episode 9.mkv",
        "Show.E12.1080p.mkv",
        "SHOW.EP05.mkv",
    ];
    for name in names {
        let parsed = parse(name);
        let rule = synthesize(name, None, &parsed, &descriptor("T", "2020", 1), MediaKind::Tv, 0);
        let caps = full_match_regex(&rule.find_pattern)
            .captures(name)
            .unwrap_or_else(|| panic!("pattern {} did not match {}", rule.find_pattern, name));

        let mut rebuilt = parsed.full_match.clone();
        let mut literals: Vec<(std::ops::Range<usize>, &str)> = Vec::new();
        for (i, group) in caps.iter().skip(1).flatten().enumerate() {
            let span = if caps.len() == 3 && i == 0 {
                parsed.season_span.clone().unwrap()
            } else {
                parsed.episode_span.clone().unwrap()
            };
            literals.push((span, group.as_str()));
        }
        literals.sort_by_key(|(span, _)| std::cmp::Reverse(span.start));
        for (span, value) in literals {
            rebuilt.replace_range(span, value);
        }
        assert_eq!(rebuilt, parsed.full_match, "{}", name);
    }
}

#[test]
fn test_find_pattern_escapes_metacharacters() {
    let name = "[Grp] Show (2020) S03E11 [1080p].mkv";
    let parsed = parse(name);
    let rule = synthesize(name, None, &parsed, &descriptor("T", "2020", 1), MediaKind::Tv, 0);
    let re = full_match_regex(&rule.find_pattern);

    assert!(re.is_match(name));
    assert!(!re.is_match("[Grp] Show (2020) S03E11 [1080p]Xmkv"));
    assert!(!re.is_match("G Show 2020 S03E11 1080p.mkv"));

    let movie = "Movie (1999) [Remux].mkv";
    let rule = synthesize(movie, None, &parse(movie), &descriptor("T", "1999", 2), MediaKind::Movie, 0);
    let re = full_match_regex(&rule.find_pattern);
    assert!(re.is_match(movie));
    assert!(!re.is_match("Movie 1999 R.mkv"));
}

#[test]
fn test_manual_numbering_without_match() {
    let name = "大宅门.mkv";
    let mut parsed = parse(name);
    parsed.season = Some("01".into());
    parsed.episode = Some("07".into());
    parsed.video_quality = vec!["1080P".into()];

    let rule = synthesize(name, Some("大宅门"), &parsed, &descriptor("大宅门", "2013", 42), MediaKind::Tv, 0);
    assert_eq!(rule.find_pattern, regex::escape(name));
    assert_eq!(rule.replace_template, "大宅门.2013.S01E07.1080p.{tmdbid=42}");
}

#[test]
fn test_normalized_name() {
    let parsed = parse("Show.S02E05.2160p.HDR.mkv");
    assert_eq!(
        normalized_name(&parsed, &descriptor("Title", "2020", 9), MediaKind::Tv),
        "Title.2020.S02E05.2160p.hdr.{tmdbid=9}"
    );
    assert_eq!(
        normalized_name(&parsed, &descriptor("Title", "", 9), MediaKind::Movie),
        "Title.2160p.hdr.{tmdbid=9}"
    );
}

#[test]
fn test_common_prefix_pattern() {
    assert_eq!(common_prefix_pattern(&["[A] ", "[B] "]), r"\[");
    assert_eq!(common_prefix_pattern(&["Ep1 ", "Ep22 "]), r"Ep\d+ ");
    assert_eq!(common_prefix_pattern(&["same", "same"]), "same");
    assert_eq!(common_prefix_pattern(&[]), "");
}

#[test]
fn test_batch_rule_matches_every_file() {
    let files = [
        "[Group] Show Name S01E02 1080p WEB-DL.mkv",
        "[Group] Show Name S01E01 1080p WEB-DL.mkv",
        "[Group] Show Name S01E10 1080p WEB-DL.mkv",
    ];
    let rule = synthesize_batch(&files, "show name", &descriptor("Title", "2020", 1), None).unwrap();

    assert_eq!(rule.find_pattern, r"\[Group\] (?i:Show Name).*?S(\d{1,2})E(\d{1,2}) 1080p.*");
    assert_eq!(rule.replace_template, r"Title.2020.S\1E\2.1080p.{tmdbid=1}");

    let re = Regex::new(&rule.find_pattern).unwrap();
    for file in files {
        let caps = re.captures(file).unwrap();
        assert_eq!(&caps[1], "01");
    }
}

#[test]
fn test_batch_rule_skips_differing_release_groups() {
    let files = ["[GroupA] Show S01E01 1080p.mkv", "[GroupB] Show S01E02 1080p.mkv"];
    let rule = synthesize_batch(&files, "Show", &descriptor("Title", "2020", 1), None).unwrap();

    assert_eq!(rule.find_pattern, r"\[Group.*?(?i:Show).*?S(\d{1,2})E(\d{1,2}) 1080p.*");
    let re = Regex::new(&rule.find_pattern).unwrap();
    let episodes: Vec<String> = files.iter().map(|file| re.captures(file).unwrap()[2].to_string()).collect();
    assert_eq!(episodes, vec!["01", "02"]);
}

#[test]
fn test_batch_episode_group_widens_for_three_digits() {
    let files = ["Show.S01E01.1080p.mkv", "Show.S01E99.1080p.mkv", "Show.S01E100.1080p.mkv"];
    let rule = synthesize_batch(&files, "Show", &descriptor("Title", "2020", 1), None).unwrap();

    assert_eq!(rule.find_pattern, r"(?i:Show).*?S(\d{1,2})E(\d{1,3})\.1080p.*");
    let re = Regex::new(&rule.find_pattern).unwrap();
    for (file, episode) in files.iter().zip(["01", "99", "100"]) {
        assert_eq!(&re.captures(file).unwrap()[2], episode);
    }
}

#[test]
fn test_batch_title_matches_any_case() {
    let files = ["SHOW.S01E02.1080p.mkv", "Show.S01E01.1080p.mkv", "show.S01E03.1080p.mkv"];
    let rule = synthesize_batch(&files, "show", &descriptor("Title", "2020", 1), None).unwrap();

    assert_eq!(rule.find_pattern, r"(?i:SHOW).*?S(\d{1,2})E(\d{1,2})\.1080p.*");
    let re = Regex::new(&rule.find_pattern).unwrap();
    for file in files {
        assert!(re.is_match(file), "{} !~ {}", file, rule.find_pattern);
    }
}

#[test]
fn test_batch_prefix_generalizes_digits() {
    let files = ["10 - Show.S01E10.mkv", "01 - Show.S01E01.mkv", "02 - Show.S01E02.mkv"];
    let rule = synthesize_batch(&files, "Show", &descriptor("Title", "2020", 1), None).unwrap();

    assert!(rule.find_pattern.starts_with(r"\d+ "));
    let re = Regex::new(&format!("^{}$", rule.find_pattern)).unwrap();
    for file in files {
        assert!(re.is_match(file), "{} !~ {}", file, rule.find_pattern);
    }
}

#[test]
fn test_batch_is_independent_of_input_order() {
    let mut files = vec![
        "Show.S01E03.720p.mkv".to_string(),
        "Show.S01E01.720p.mkv".to_string(),
        "Show.S01E02.720p.mkv".to_string(),
    ];
    let d = descriptor("Title", "2020", 1);
    let first = synthesize_batch(&files, "Show", &d, None);
    files.reverse();
    assert_eq!(first, synthesize_batch(&files, "Show", &d, None));
}

#[test]
fn test_batch_season_override() {
    let files = ["Show.S02E01.mkv", "Show.S02E02.mkv"];
    let rule = synthesize_batch(&files, "Show", &descriptor("Title", "2020", 1), Some("03")).unwrap();
    assert_eq!(rule.replace_template, r"Title.2020.S03E\2.{tmdbid=1}");
}

#[test]
fn test_batch_returns_none_without_anchor() {
    let d = descriptor("Title", "2020", 1);
    assert!(synthesize_batch(&["Other.S01E01.mkv"], "Show", &d, None).is_none());
    assert!(synthesize_batch(&["Show.Ep03.mkv"], "Show", &d, None).is_none());
    assert!(synthesize_batch::<&str>(&[], "Show", &d, None).is_none());
    assert!(synthesize_batch(&["Show.S01E01.mkv"], "", &d, None).is_none());
}

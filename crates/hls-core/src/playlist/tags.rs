//! Line-level tag recognition and attribute-list parsing.
//!
//! Matching is an exact, case-sensitive prefix test on `#<NAME>` followed by
//! either `:` or the end of the line. No whitespace or case normalisation is
//! applied; playlists are whitespace-sensitive.

use std::fmt;

/// Every tag the checks consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    ExtM3u,
    Inf,
    Version,
    ByteRange,
    Discontinuity,
    Key,
    Map,
    ProgramDateTime,
    DateRange,
    TargetDuration,
    MediaSequence,
    EndList,
    PlaylistType,
    IFramesOnly,
    DiscontinuitySequence,
    Media,
    StreamInf,
    IFrameStreamInf,
    SessionData,
    SessionKey,
    IndependentSegments,
    Start,
    AllowCache,
}

impl Tag {
    pub const ALL: [Tag; 23] = [
        Tag::ExtM3u,
        Tag::Inf,
        Tag::Version,
        Tag::ByteRange,
        Tag::Discontinuity,
        Tag::Key,
        Tag::Map,
        Tag::ProgramDateTime,
        Tag::DateRange,
        Tag::TargetDuration,
        Tag::MediaSequence,
        Tag::EndList,
        Tag::PlaylistType,
        Tag::IFramesOnly,
        Tag::DiscontinuitySequence,
        Tag::Media,
        Tag::StreamInf,
        Tag::IFrameStreamInf,
        Tag::SessionData,
        Tag::SessionKey,
        Tag::IndependentSegments,
        Tag::Start,
        Tag::AllowCache,
    ];

    /// Tag name without the leading `#`.
    pub const fn name(self) -> &'static str {
        match self {
            Tag::ExtM3u => "EXTM3U",
            Tag::Inf => "EXTINF",
            Tag::Version => "EXT-X-VERSION",
            Tag::ByteRange => "EXT-X-BYTERANGE",
            Tag::Discontinuity => "EXT-X-DISCONTINUITY",
            Tag::Key => "EXT-X-KEY",
            Tag::Map => "EXT-X-MAP",
            Tag::ProgramDateTime => "EXT-X-PROGRAM-DATE-TIME",
            Tag::DateRange => "EXT-X-DATERANGE",
            Tag::TargetDuration => "EXT-X-TARGETDURATION",
            Tag::MediaSequence => "EXT-X-MEDIA-SEQUENCE",
            Tag::EndList => "EXT-X-ENDLIST",
            Tag::PlaylistType => "EXT-X-PLAYLIST-TYPE",
            Tag::IFramesOnly => "EXT-X-I-FRAMES-ONLY",
            Tag::DiscontinuitySequence => "EXT-X-DISCONTINUITY-SEQUENCE",
            Tag::Media => "EXT-X-MEDIA",
            Tag::StreamInf => "EXT-X-STREAM-INF",
            Tag::IFrameStreamInf => "EXT-X-I-FRAME-STREAM-INF",
            Tag::SessionData => "EXT-X-SESSION-DATA",
            Tag::SessionKey => "EXT-X-SESSION-KEY",
            Tag::IndependentSegments => "EXT-X-INDEPENDENT-SEGMENTS",
            Tag::Start => "EXT-X-START",
            Tag::AllowCache => "EXT-X-ALLOW-CACHE",
        }
    }

    /// Tags that may only appear in a Master playlist.
    pub const fn is_master_only(self) -> bool {
        matches!(
            self,
            Tag::Media | Tag::StreamInf | Tag::IFrameStreamInf | Tag::SessionData | Tag::SessionKey
        )
    }

    /// Tags that may only appear in a Variant (media) playlist.
    pub const fn is_media_only(self) -> bool {
        matches!(
            self,
            Tag::Inf
                | Tag::ByteRange
                | Tag::Discontinuity
                | Tag::Key
                | Tag::Map
                | Tag::ProgramDateTime
                | Tag::DateRange
                | Tag::TargetDuration
                | Tag::MediaSequence
                | Tag::EndList
                | Tag::PlaylistType
                | Tag::IFramesOnly
                | Tag::DiscontinuitySequence
        )
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Match a raw line against the known tags.
///
/// Returns the tag and the raw value after `:` (if any).
pub fn match_tag(line: &str) -> Option<(Tag, Option<&str>)> {
    let body = line.strip_prefix('#')?;
    if !body.starts_with("EXT") {
        return None;
    }
    Tag::ALL.iter().find_map(|&tag| {
        let rest = body.strip_prefix(tag.name())?;
        if rest.is_empty() {
            Some((tag, None))
        } else {
            rest.strip_prefix(':').map(|value| (tag, Some(value)))
        }
    })
}

/// Raw value of `line` if it carries `tag`.
pub fn tag_value(line: &str, tag: Tag) -> Option<Option<&str>> {
    match match_tag(line) {
        Some((found, value)) if found == tag => Some(value),
        _ => None,
    }
}

/// Whether `line` carries `tag`.
pub fn is_tag(line: &str, tag: Tag) -> bool {
    tag_value(line, tag).is_some()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    Tag(Tag, Option<&'a str>),
    /// `#EXT...` line with a tag name this matcher does not model.
    UnknownTag,
    Comment,
    Uri(&'a str),
}

pub fn classify_line(line: &str) -> LineKind<'_> {
    if line.is_empty() {
        return LineKind::Blank;
    }
    if let Some((tag, value)) = match_tag(line) {
        return LineKind::Tag(tag, value);
    }
    if line.starts_with("#EXT") {
        LineKind::UnknownTag
    } else if line.starts_with('#') {
        LineKind::Comment
    } else {
        LineKind::Uri(line)
    }
}

/// Ordered attribute list of an attribute-bearing tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeList<'a> {
    items: Vec<(&'a str, &'a str)>,
}

impl<'a> AttributeList<'a> {
    /// Parse `NAME=VALUE,NAME="VALUE",...`. Quoted values may contain commas.
    /// Items without `=` are skipped.
    pub fn parse(input: &'a str) -> Self {
        let mut items = Vec::new();
        for item in split_unquoted(input, ',') {
            if let Some((name, value)) = item.split_once('=') {
                if !name.is_empty() {
                    items.push((name, value));
                }
            }
        }
        Self { items }
    }

    /// Value with surrounding quotes removed.
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.items
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| unquote(v))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|(n, _)| *n == name)
    }

}

/// Duration token of an `EXTINF` value (`<duration>,[<title>]`).
pub fn extinf_duration(value: &str) -> &str {
    value.split(',').next().unwrap_or(value)
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn split_unquoted(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == sep && !in_quotes {
            parts.push(&input[start..i]);
            start = i + c.len_utf8();
        }
    }
    if start < input.len() {
        parts.push(&input[start..]);
    }
    parts
}

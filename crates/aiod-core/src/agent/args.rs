//! Argument vectors for every external agent invocation.

use std::ffi::OsString;
use std::path::Path;

use crate::request::RequestDescriptor;

/// How the download agent reports a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// `-#` progress bar on the terminal (the episode).
    Progress,
    /// Silent except for errors (cover art).
    Quiet,
}

/// Download agent: follow redirects, fail on HTTP errors, all headers,
/// optional cookie, explicit output file.
pub fn download(url: &str, request: &RequestDescriptor, dest: &Path, mode: TransferMode) -> Vec<OsString> {
    let mut args: Vec<OsString> = match mode {
        TransferMode::Progress => vec!["-#".into()],
        TransferMode::Quiet => vec!["-s".into(), "-S".into()],
    };
    args.push("-L".into());
    args.push("-f".into());
    args.push(url.into());
    for line in request.header_lines() {
        args.push("-H".into());
        args.push(line.into());
    }
    if let Some(cookie) = request.cookie() {
        args.push("-b".into());
        args.push(cookie.into());
    }
    args.push("-o".into());
    args.push(dest.into());
    args
}

/// Which duration the probe agent is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationQuery {
    /// Container-level duration.
    Format,
    /// Stream-level duration (fallback).
    Stream,
}

impl DurationQuery {
    fn entries(self) -> &'static str {
        match self {
            DurationQuery::Format => "format=duration",
            DurationQuery::Stream => "stream=duration",
        }
    }
}

/// Probe agent: a single bare number per line.
pub fn probe_duration(input: &Path, query: DurationQuery) -> Vec<OsString> {
    vec![
        "-v".into(),
        "error".into(),
        "-show_entries".into(),
        query.entries().into(),
        "-of".into(),
        "csv=p=0".into(),
        input.into(),
    ]
}

/// Transcoding agent, shape (a): drop video, CBR MP3, progress on stdout.
pub fn transcode_to_mp3(input: &Path, output: &Path, bitrate: &str) -> Vec<OsString> {
    vec![
        "-hide_banner".into(),
        "-y".into(),
        "-i".into(),
        input.into(),
        "-vn".into(),
        "-acodec".into(),
        "libmp3lame".into(),
        "-b:a".into(),
        bitrate.into(),
        output.into(),
        "-progress".into(),
        "pipe:1".into(),
        "-nostats".into(),
    ]
}

/// Transcoding agent, shape (b): image format conversion to PNG.
pub fn convert_image_to_png(input: &Path, output: &Path) -> Vec<OsString> {
    vec![
        "-y".into(),
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
        "-i".into(),
        input.into(),
        "-c:v".into(),
        "png".into(),
        output.into(),
    ]
}

/// Transcoding agent, shape (c): copy the audio, attach the image as the
/// front cover, force ID3v2.3 for player compatibility.
///
/// The mp3 muxer derives the APIC picture type from the picture stream's
/// `comment` tag, so `Cover (front)` marks it as the front cover.
pub fn embed_cover(mp3: &Path, image: &Path, image_codec: &str, output: &Path) -> Vec<OsString> {
    vec![
        "-y".into(),
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
        "-i".into(),
        mp3.into(),
        "-i".into(),
        image.into(),
        "-map".into(),
        "0:a".into(),
        "-map".into(),
        "1:v".into(),
        "-c:a".into(),
        "copy".into(),
        "-c:v".into(),
        image_codec.into(),
        "-disposition:v:0".into(),
        "attached_pic".into(),
        "-id3v2_version".into(),
        "3".into(),
        "-metadata:s:v".into(),
        "title=".into(),
        "-metadata:s:v".into(),
        "comment=Cover (front)".into(),
        output.into(),
    ]
}

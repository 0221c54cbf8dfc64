//! Shell-script stand-ins for curl, ffmpeg and ffprobe.
//!
//! Each script appends its argument list to a shared log so tests can assert
//! on the exact invocations, then produces whatever file the real agent
//! would have written.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use aiod_core::config::{AiodConfig, RetryConfig, ToolsConfig};

static SERIAL: Mutex<()> = Mutex::new(());

/// Serializes tests that write and then execute scripts, so no other test
/// forks while a script is still open for writing (ETXTBSY).
pub fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

#[derive(Debug, Clone, Copy)]
pub struct Behavior {
    /// Bytes written for media downloads (image downloads get 2048).
    pub media_bytes: usize,
    pub fail_download: bool,
    pub fail_transcode: bool,
    pub fail_convert: bool,
    pub fail_embed: bool,
    /// ffprobe answer to the `format=duration` query.
    pub format_duration: &'static str,
    /// ffprobe answer to the `stream=duration` query.
    pub stream_duration: &'static str,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            media_bytes: 60_000,
            fail_download: false,
            fail_transcode: false,
            fail_convert: false,
            fail_embed: false,
            format_duration: "2.5",
            stream_duration: "2.5",
        }
    }
}

pub struct FakeAgents {
    pub bin_dir: PathBuf,
    pub log: PathBuf,
}

fn write_script(path: &Path, body: &str) {
    fs::write(path, format!("#!/bin/sh\n{body}")).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

fn exit_code(fail: bool) -> &'static str {
    if fail {
        "exit 1"
    } else {
        ":"
    }
}

impl FakeAgents {
    pub fn install(bin_dir: &Path, behavior: Behavior) -> Self {
        let log = bin_dir.join("agents.log");
        fs::write(&log, "").unwrap();
        let log_s = log.display().to_string();

        let curl = format!(
            r#"echo "curl $*" >> '{log_s}'
{fail}
out=""
prev=""
for a in "$@"; do
  if [ "$prev" = "-o" ]; then out="$a"; fi
  prev="$a"
done
case "$out" in
  *.jpg|*.jpeg|*.png|*.webp|*.heic) head -c 2048 /dev/zero > "$out" ;;
  *) head -c {media} /dev/zero > "$out" ;;
esac
"#,
            fail = if behavior.fail_download { "exit 22" } else { ":" },
            media = behavior.media_bytes,
        );
        write_script(&bin_dir.join("curl"), &curl);

        let ffmpeg = format!(
            r#"echo "ffmpeg $*" >> '{log_s}'
last=""
for a in "$@"; do last="$a"; done
case " $* " in
  *" -progress "*)
    printf 'out_time_ms=1000000\nprogress=continue\n'
    {transcode}
    printf 'ID3' > "${{10}}"
    printf 'out_time_ms=N/A\nout_time_ms=2500000\nprogress=end\n'
    ;;
  *" attached_pic "*)
    printf 'partial' > "$last"
    {embed}
    printf 'ID3+APIC' > "$last"
    ;;
  *)
    {convert}
    printf 'PNG' > "$last"
    ;;
esac
"#,
            transcode = exit_code(behavior.fail_transcode),
            embed = exit_code(behavior.fail_embed),
            convert = exit_code(behavior.fail_convert),
        );
        write_script(&bin_dir.join("ffmpeg"), &ffmpeg);

        write_script(
            &bin_dir.join("ffprobe"),
            &format!(
                r#"echo "ffprobe $*" >> '{log_s}'
case " $* " in
  *" format=duration "*) echo '{format}' ;;
  *) echo '{stream}' ;;
esac
"#,
                format = behavior.format_duration,
                stream = behavior.stream_duration,
            ),
        );

        Self {
            bin_dir: bin_dir.to_path_buf(),
            log,
        }
    }

    pub fn tools(&self) -> ToolsConfig {
        ToolsConfig {
            curl: self.bin_dir.join("curl"),
            ffmpeg: self.bin_dir.join("ffmpeg"),
            ffprobe: self.bin_dir.join("ffprobe"),
        }
    }

    /// Config wired to the fakes, with zero backoff.
    pub fn config(&self) -> AiodConfig {
        AiodConfig {
            retry: RetryConfig {
                max_attempts: 3,
                backoff_base: 0.0,
            },
            tools: self.tools(),
            ..AiodConfig::default()
        }
    }

    pub fn invocations(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn invocations_of(&self, agent: &str) -> Vec<String> {
        let prefix = format!("{agent} ");
        self.invocations()
            .into_iter()
            .filter(|l| l.starts_with(&prefix))
            .collect()
    }
}

// SPDX-License-Identifier: MPL-2.0
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use codec_adapter::codecs::{self, CodecKind};
use codec_adapter::config;
use codec_adapter::infrastructure::LibrarySupport;
use codec_adapter::media::image_file;
use codec_adapter::{apply, ApplyOptions, ApplySource};

const HELP: &str = "\
Usage: codec_adapter [OPTIONS] IMAGE

Options:
  --codec NAME        bpg, bpg-x265, bpg-jctvc, webp, jpeg, jpegfi,
                      x265, av1, h264 [default: webp]
  --quality Q         quality level (codec specific)
  --ffmpeg PATH       ffmpeg executable
  --backend KIND      library | process
  --encoded PATH      keep the encoded file
  --decoded PATH      keep the decoded image
  --list              list codecs usable on this system
  -h, --help          print this help
";

struct Args {
    codec: CodecKind,
    quality: Option<i32>,
    ffmpeg: Option<PathBuf>,
    backend: Option<String>,
    encoded: Option<PathBuf>,
    decoded: Option<PathBuf>,
    list: bool,
    image: Option<PathBuf>,
}

fn parse_args() -> Result<Args, pico_args::Error> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    Ok(Args {
        codec: args
            .opt_value_from_str("--codec")?
            .unwrap_or(CodecKind::Webp),
        quality: args.opt_value_from_str("--quality")?,
        ffmpeg: args.opt_value_from_os_str("--ffmpeg", |s| {
            Ok::<_, std::convert::Infallible>(PathBuf::from(s))
        })?,
        backend: args.opt_value_from_str("--backend")?,
        encoded: args.opt_value_from_os_str("--encoded", |s| {
            Ok::<_, std::convert::Infallible>(PathBuf::from(s))
        })?,
        decoded: args.opt_value_from_os_str("--decoded", |s| {
            Ok::<_, std::convert::Infallible>(PathBuf::from(s))
        })?,
        list: args.contains("--list"),
        image: args.finish().into_iter().next().map(PathBuf::from),
    })
}

fn run(args: Args) -> codec_adapter::Result<()> {
    let mut settings = config::load().unwrap_or_default();
    if args.ffmpeg.is_some() {
        settings.ffmpeg_path = args.ffmpeg;
    }
    if args.backend.is_some() {
        settings.backend = args.backend;
    }
    let support = LibrarySupport::detect();

    if args.list {
        for codec in codecs::discover(&settings, support) {
            println!(
                "{:<10} quality {:<8} .{}{}",
                codec.name(),
                codec.quality_steps().to_string(),
                codec.file_extension(),
                if codec.can_stream() { "  (streaming)" } else { "" }
            );
        }
        return Ok(());
    }

    let Some(image) = args.image else {
        eprint!("{HELP}");
        return Ok(());
    };

    let mut codec = codecs::build(args.codec, &settings, support)?;
    if !codec.available_for_use() {
        return Err(codec_adapter::Error::Transport(format!(
            "{} is not usable on this system",
            codec.name()
        )));
    }

    let pixels = image_file::read_rgb(&image)?.into_dyn();
    let options = ApplyOptions {
        quality: args.quality,
        encoded_path: args.encoded.as_deref(),
        decoded_path: args.decoded.as_deref(),
    };

    let started = Instant::now();
    let outcome = apply(codec.as_mut(), ApplySource::Tensor(pixels.view()), &options)?;
    let elapsed = started.elapsed();

    let pixel_count = pixels.shape()[0] * pixels.shape()[1];
    #[allow(clippy::cast_precision_loss)]
    let bpp = outcome.encoded_size as f64 * 8.0 / pixel_count as f64;
    println!(
        "{}: {} bytes, {bpp:.3} bpp, {:.1} ms",
        codec.name(),
        outcome.encoded_size,
        elapsed.as_secs_f64() * 1000.0
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(2);
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            for record in err.recent_calls() {
                eprintln!("{record}");
            }
            ExitCode::FAILURE
        }
    }
}

mod core;
mod dataset;
mod decoder;
mod shared;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

use crate::core::{extract_clips, ExtractJob, NamingConvention};
use crate::dataset::{kitti, merge, subset, AugmentSpec};
use crate::decoder::VideoDecoder;
use crate::shared::constants;
use crate::utils::logger;

#[derive(Parser)]
#[command(author, version, about = "Offline dataset preparation for vision training pipelines", long_about = None)]
struct Cli {
    /// Directory for error.log and debug.log
    #[arg(long, global = true, default_value = ".")]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cut annotated action clips out of videos as numbered frame images
    Extract {
        /// First video to process (1-based)
        #[arg(long, default_value_t = 1)]
        start: usize,
        /// Last video to process (inclusive)
        #[arg(long, default_value_t = 2)]
        end: usize,
        /// Folder with the per-video annotation files
        #[arg(long)]
        labels_path: PathBuf,
        /// Folder with the .mp4 videos
        #[arg(long)]
        video_path: PathBuf,
        /// Output folder name, e.g. train/val/test
        #[arg(long)]
        data_split: PathBuf,
        /// Side length of the square output frames
        #[arg(long, default_value_t = constants::DEFAULT_TARGET_SIZE)]
        size: u32,
        /// Image format of the written frames
        #[arg(long, default_value = constants::DEFAULT_IMAGE_EXT)]
        ext: String,
        /// Video file name suffix replaced to find the annotation file
        #[arg(long, default_value = constants::DEFAULT_VIDEO_SUFFIX)]
        video_suffix: String,
        /// Annotation file name suffix
        #[arg(long, default_value = constants::DEFAULT_LABEL_SUFFIX)]
        label_suffix: String,
    },
    /// Convert Pascal-VOC XML labels to KITTI text labels
    Kitti {
        /// An .xml file or a folder of them
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Copy the samples named in a list file out of a dataset
    Subset {
        /// Dataset folder containing images/ and labels/
        #[arg(long)]
        original: PathBuf,
        /// File with one sample name per line
        #[arg(long)]
        names: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Merge two datasets, renumbering every sample
    Merge {
        #[arg(long)]
        first: PathBuf,
        #[arg(long)]
        second: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Write a randomized augmentation spec file
    AugSpec {
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        #[arg(long, default_value = constants::DEFAULT_IMAGE_EXT)]
        ext: String,
        #[arg(short, long)]
        output: PathBuf,
        /// Seed for reproducible specs; random when omitted
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logger::init(&cli.log_dir);

    match cli.command {
        Commands::Extract {
            start,
            end,
            labels_path,
            video_path,
            data_split,
            size,
            ext,
            video_suffix,
            label_suffix,
        } => {
            let job = ExtractJob {
                start,
                end,
                labels_dir: labels_path,
                video_dir: video_path,
                data_split,
                target_size: size,
                image_ext: ext,
                naming: NamingConvention {
                    video_suffix,
                    label_suffix,
                },
            };

            let summary = extract_clips(&job, VideoDecoder::open).map_err(|e| {
                logger::error(&format!("extract failed: {:#}", e));
                e
            })?;

            println!(
                "Extracted {} clip(s), {} image(s) from {} video(s) into {}",
                summary.clips,
                summary.images,
                summary.videos,
                job.data_split.display()
            );
        }
        Commands::Kitti { input, output } => {
            let count = kitti::convert(&input, &output)?;
            println!("Converted {} annotation file(s) into {}", count, output.display());
        }
        Commands::Subset {
            original,
            names,
            output,
        } => {
            let count = subset::create_subset(&original, &names, &output)?;
            println!("Copied {} sample(s) into {}", count, output.display());
        }
        Commands::Merge {
            first,
            second,
            output,
        } => {
            merge::combine_datasets(&first, &second, &output)?;
        }
        Commands::AugSpec {
            width,
            height,
            ext,
            output,
            seed,
        } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let spec = AugmentSpec::random(&mut rng, width, height, &ext);
            spec.write(&output)?;
            logger::info(&format!("aug-spec: wrote {:?} to {}", spec, output.display()));
            println!("Wrote augmentation spec to {}", output.display());
        }
    }

    Ok(())
}

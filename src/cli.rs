use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "npzip")]
#[command(version)]
#[command(about = "Pack files into a ZIP or NumPy .npz archive", long_about = None)]
#[command(after_help = "Examples:\n  \
  npzip weights a.npy b.npy       create weights.npz holding a.npy and b.npy\n  \
  npzip -z logs.zip run/*.txt     deflate text files into logs.zip\n  \
  npzip -j -t 1700000000 out data/x.npy   store x.npy with a fixed mtime")]
pub struct Cli {
    /// Archive to create (.npz is appended unless it ends in .npz or .zip)
    #[arg(value_name = "ARCHIVE")]
    pub archive: String,

    /// Files to add
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<String>,

    /// Compress entries with deflate instead of storing them
    #[arg(short = 'z')]
    pub deflate: bool,

    /// Deflate level (0-9)
    #[arg(short = 'L', value_name = "LEVEL", default_value_t = 6,
          value_parser = clap::value_parser!(u32).range(0..=9))]
    pub level: u32,

    /// Junk paths (store only the file name)
    #[arg(short = 'j')]
    pub junk_paths: bool,

    /// Modification time for all entries, in seconds since the Unix epoch
    /// (default: now)
    #[arg(short = 't', value_name = "SECONDS")]
    pub timestamp: Option<i64>,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }
}

//! CLI argument definitions for `xyzplot`, using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Generate Cartesian XYZ-plot settings sweeps.
#[derive(Parser, Debug)]
#[command(
    name = "xyzplot",
    about = "Generate Cartesian XYZ-plot settings sweeps",
    long_about = "Generate one render-settings file per combination of up to three axis values.\n\n\
        Each axis varies one field of a base settings document. Values are given as\n\
        expressions such as `1-5`, `0-1 [5]`, `10-20 (+5)` or `a, b, c`.",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Flags accepted by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose/debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Project directory holding config.yaml (default: nearest .xyzplot/)
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate one settings file per axis combination
    Generate(GenerateArgs),

    /// Parse value expressions and show the resulting values
    Parse(ParseArgs),

    /// List the parameters of a base settings file
    Params(ParamsArgs),

    /// Preview the filename template for an axis selection
    Name(NameArgs),

    /// Manage the project configuration
    Config(ConfigArgs),

    /// Print version information
    Version,

    /// Generate shell completion scripts
    Completion(CompletionArgs),
}

/// Field selection and value rows for the three axes.
#[derive(Args, Debug, Clone, Default)]
pub struct AxisArgs {
    /// Field varied along the X axis
    #[arg(long = "x", value_name = "FIELD")]
    pub x: Option<String>,

    /// X value expression; repeat for several rows
    #[arg(long = "x-values", value_name = "EXPR")]
    pub x_values: Vec<String>,

    /// Selected X option for choice fields; repeatable
    #[arg(long = "x-choice", value_name = "TOKEN")]
    pub x_choice: Vec<String>,

    /// How X values combine with prompts: append or override
    #[arg(long = "x-prompt-mode", value_name = "MODE")]
    pub x_prompt_mode: Option<String>,

    /// Field varied along the Y axis
    #[arg(long = "y", value_name = "FIELD")]
    pub y: Option<String>,

    /// Y value expression; repeat for several rows
    #[arg(long = "y-values", value_name = "EXPR")]
    pub y_values: Vec<String>,

    /// Selected Y option for choice fields; repeatable
    #[arg(long = "y-choice", value_name = "TOKEN")]
    pub y_choice: Vec<String>,

    /// How Y values combine with prompts: append or override
    #[arg(long = "y-prompt-mode", value_name = "MODE")]
    pub y_prompt_mode: Option<String>,

    /// Field varied along the optional Z axis
    #[arg(long = "z", value_name = "FIELD")]
    pub z: Option<String>,

    /// Z value expression; repeat for several rows
    #[arg(long = "z-values", value_name = "EXPR")]
    pub z_values: Vec<String>,

    /// Selected Z option for choice fields; repeatable
    #[arg(long = "z-choice", value_name = "TOKEN")]
    pub z_choice: Vec<String>,

    /// How Z values combine with prompts: append or override
    #[arg(long = "z-prompt-mode", value_name = "MODE")]
    pub z_prompt_mode: Option<String>,
}

/// Filename options that override the configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct NamingArgs {
    /// Filename template, e.g. "{x_param}-{x_value}_{y_param}-{y_value}"
    #[arg(long)]
    pub template: Option<String>,

    /// Value of the {filename} placeholder
    #[arg(long)]
    pub filename: Option<String>,

    /// File extension, including the leading dot
    #[arg(long)]
    pub extension: Option<String>,

    /// Duplicate filename policy: warn or suffix
    #[arg(long, value_name = "POLICY")]
    pub on_duplicate: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Base settings file (JSON, full-line comments allowed)
    pub base: PathBuf,

    #[command(flatten)]
    pub axes: AxisArgs,

    /// Shared override applied to every file; repeatable
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    pub set: Vec<String>,

    /// Animation mode (2D or 3D); adds its motion fields
    #[arg(long, value_name = "MODE")]
    pub animation_mode: Option<String>,

    /// Use an init image for every file
    #[arg(long, value_name = "PATH", conflicts_with = "no_init")]
    pub init_image: Option<String>,

    /// Init image strength (default: base value, or 0.8)
    #[arg(long, requires = "init_image")]
    pub strength: Option<String>,

    /// Turn the init image off and drop its dependent fields
    #[arg(long)]
    pub no_init: bool,

    /// Frame 0 prompt replacing the base prompts
    #[arg(long, conflicts_with = "keyframe")]
    pub prompt: Option<String>,

    /// Negative prompt appended as `--neg`
    #[arg(long, requires = "prompt")]
    pub negative: Option<String>,

    /// Prompt keyframe replacing the base prompts; repeatable
    #[arg(long = "keyframe", value_name = "FRAME=TEXT")]
    pub keyframe: Vec<String>,

    #[command(flatten)]
    pub naming: NamingArgs,

    /// Output directory (default from config)
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Write each Z value's files into its own subdirectory
    #[arg(long)]
    pub group_by_z: bool,

    /// Show what would be written without writing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Value expressions to parse
    #[arg(required = true)]
    pub expressions: Vec<String>,

    /// Resolve the expressions as the rows of one axis over this field
    #[arg(long, value_name = "FIELD")]
    pub field: Option<String>,
}

#[derive(Args, Debug)]
pub struct ParamsArgs {
    /// Base settings file
    pub base: PathBuf,

    /// Only list fields of this kind (boolean, choice, prompts, schedule, numeric)
    #[arg(long)]
    pub kind: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct NameArgs {
    /// Base settings file supplying {seed}, {steps} and similar values
    pub base: Option<PathBuf>,

    #[command(flatten)]
    pub axes: AxisArgs,

    #[command(flatten)]
    pub naming: NamingArgs,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Create .xyzplot/config.yaml with the default settings
    Init(ConfigInitArgs),

    /// Print the effective configuration
    Show,

    /// Print the project directory in use
    Path,
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionArgs {
    #[command(subcommand)]
    pub command: CompletionCommands,
}

#[derive(Subcommand, Debug)]
pub enum CompletionCommands {
    /// Generate bash completions
    Bash,
    /// Generate zsh completions
    Zsh,
    /// Generate fish completions
    Fish,
    /// Generate PowerShell completions
    Powershell,
}

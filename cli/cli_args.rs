use clap::{Args, Parser, Subcommand, ValueEnum};
use formatall_core::SubProjectDescent;
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ProjectConfigOpts {
    #[arg(
        long,
        help = "Specify the project root used for config lookup (default: current dir).",
        help_heading = "Project Setup",
        value_name = "PATH"
    )]
    pub project_root: Option<PathBuf>,

    #[arg(
        long,
        help = "Path of the TOML config file, relative to the project root (default: .formatall/formatall.toml).",
        value_name = "CONFIG_FILE",
        conflicts_with = "no_config",
        help_heading = "Project Setup"
    )]
    pub config: Option<String>,

    #[arg(
        long,
        help = "Disable loading any TOML config file.",
        conflicts_with = "config",
        help_heading = "Project Setup"
    )]
    pub no_config: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SelectionOpts {
    #[arg(
        value_name = "PATH",
        help = "Selected item: a directory (project) or a single file [default: project root]."
    )]
    pub paths: Vec<PathBuf>,

    #[arg(
        long,
        help = "Treat the selected directory as a solution; each entry is a project.",
        help_heading = "Selection"
    )]
    pub solution: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterOpts {
    #[arg(
        long = "include",
        value_name = "PATTERNS",
        help = "Inclusion file pattern, e.g. '*.cs;*.xaml' (overrides config).",
        help_heading = "Filtering"
    )]
    pub inclusion: Option<String>,

    #[arg(
        long = "exclude",
        value_name = "PATTERNS",
        help = "Exclusion file pattern, e.g. '*.Designer.cs' (overrides config).",
        help_heading = "Filtering"
    )]
    pub exclusion: Option<String>,

    #[arg(
        long,
        help = "Also descend below text templates (*.tt) into their generated output.",
        help_heading = "Filtering"
    )]
    pub include_generated: bool,

    #[arg(
        long,
        value_enum,
        value_name = "POLICY",
        help = "Whether the hierarchy filter also gates nested sub-projects.",
        help_heading = "Filtering"
    )]
    pub sub_project_descent: Option<DescentArg>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescentArg {
    Filtered,
    Always,
}

impl From<DescentArg> for SubProjectDescent {
    fn from(arg: DescentArg) -> Self {
        match arg {
            DescentArg::Filtered => SubProjectDescent::Filtered,
            DescentArg::Always => SubProjectDescent::Always,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Run a command over every matching file of a project tree.",
    long_about = "formatall walks the selected project breadth-first, skips the output of text \ntemplates, filters file names with wildcard patterns and runs the configured \ncommand(s) on each remaining file.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  formatall list --include '*.rs'\n  formatall run src --command 'rustfmt {file}'\n  formatall run --solution . --exclude '*.Designer.cs' --dry-run\n  formatall config --save",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase message verbosity (-v, -vv).")]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        help = "Silence informational messages and warnings."
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(
        visible_alias = "l",
        visible_alias = "ls",
        about = "List the files a run would process."
    )]
    List(ListArgs),

    #[command(
        visible_alias = "r",
        about = "Run the configured command(s) on every selected file."
    )]
    Run(RunArgs),

    #[command(about = "Show or save the default configuration file structure.")]
    Config(ConfigArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub selection: SelectionOpts,
    #[clap(flatten)]
    pub filters: FilterOpts,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Set the output format.",
        help_heading = "Output Formatting"
    )]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub selection: SelectionOpts,
    #[clap(flatten)]
    pub filters: FilterOpts,

    #[arg(
        short = 'c',
        long,
        value_name = "COMMANDS",
        help = "Command(s) to run, separated by ';'. '{file}' is replaced by the path.",
        help_heading = "Execution"
    )]
    pub command: Option<String>,

    #[arg(
        long,
        help = "Print each command line instead of running it.",
        help_heading = "Execution"
    )]
    pub dry_run: bool,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Set the summary format.",
        help_heading = "Output Formatting"
    )]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,

    #[arg(long, help = "Save default config structure to default path.")]
    pub save: bool,

    #[arg(long, requires = "save", help = "Overwrite an existing config file.")]
    pub force: bool,
}

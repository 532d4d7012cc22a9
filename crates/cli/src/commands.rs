use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the on-start stage for one import set and publish its ignore set
    Run {
        #[arg(long, help = "CSV export of the import table")]
        input: String,

        #[arg(long, help = "Import set whose rows are checked for duplicates")]
        import_set: String,

        #[arg(long, help = "Transform map name; the run aborts when omitted")]
        map: Option<String>,

        #[arg(
            long,
            help = "Name of the import table (defaults to the input file stem)"
        )]
        source_table: Option<String>,

        #[arg(long, default_value = "alm_hardware", help = "Target table of the map")]
        target_table: String,

        #[arg(long, help = "Optional .env file with ASSET_IMPORT_* settings")]
        env_file: Option<String>,

        #[arg(long, help = "State directory (defaults to ~/.asset-import/state)")]
        state_dir: Option<String>,

        #[arg(
            long,
            help = "If specified, writes the JSON report to this file instead of stdout"
        )]
        output: Option<String>,
    },
    /// Show the ignore set published by an earlier run
    Show {
        #[arg(long, help = "Run ID to inspect")]
        run: String,

        #[arg(long, help = "State directory (defaults to ~/.asset-import/state)")]
        state_dir: Option<String>,

        #[arg(long, help = "Print as JSON instead of a table")]
        json: bool,
    },
}

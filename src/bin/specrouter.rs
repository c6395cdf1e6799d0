fn main() -> anyhow::Result<()> {
    specrouter::cli::run_cli()
}

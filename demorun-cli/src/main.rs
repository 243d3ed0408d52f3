fn main() -> anyhow::Result<()> {
    demorun_cli::run()
}

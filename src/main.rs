fn main() -> anyhow::Result<()> {
    galaxy_scan::cli_main::main()
}

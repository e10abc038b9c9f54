fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = wago::args::parse();
    wago::cli::main(args)
}

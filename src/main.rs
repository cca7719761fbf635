fn main() -> anyhow::Result<()> {
    env_logger::init();
    u6map_rust::run()
}

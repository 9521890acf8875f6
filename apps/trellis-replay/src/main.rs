mod replay;

fn main() -> anyhow::Result<()> {
    replay::run()
}

fn main() -> anyhow::Result<()> {
    artful_debug::run()?;
    Ok(())
}

use anyhow::Result;

fn main() -> Result<()> {
    minipy::cli::main()
}

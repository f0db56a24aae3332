fn main() -> anyhow::Result<()> {
    stackgraph_lib::main()
}

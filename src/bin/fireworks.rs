use festive_ngin::{config::FireworksConfig, fireworks::FireworksFlow, flow};

fn main() -> anyhow::Result<()> {
    let fireworks = FireworksFlow::constructor::<()>(FireworksConfig::default());
    flow::run(vec![fireworks])
}

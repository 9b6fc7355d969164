use festive_ngin::{config::SceneConfig, flow, scene::SceneFlow};

fn main() -> anyhow::Result<()> {
    let scene = SceneFlow::constructor::<()>(SceneConfig::default());
    flow::run(vec![scene])
}

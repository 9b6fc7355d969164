#[cfg(feature = "integration-tests")]
use std::sync::Arc;

#[cfg(feature = "integration-tests")]
use crate::common::test_utils::{Empty, TestRender};
#[cfg(feature = "integration-tests")]
use festive_ngin::{
    context::{Context, InitContext},
    data_structures::{
        channels::{Channels, MaterialChannel},
        model::{Material, MaterialDefaults, Model},
        scene_graph::{ContainerNode, ModelNode, for_each_material},
        texture::{ColorSpace, Texture},
    },
    flow::ImageTestResult,
    resources::texture::material_layout,
    scene::apply_textures,
};

#[cfg(feature = "integration-tests")]
mod common;

/// A container holding one model with `materials` default materials.
#[cfg(feature = "integration-tests")]
fn model_tree(ctx: &Context, layout: &wgpu::BindGroupLayout, materials: usize) -> ContainerNode {
    let defaults = MaterialDefaults::new(&ctx.device, &ctx.queue);
    let materials = (0..materials)
        .map(|i| {
            Material::new(
                &ctx.device,
                &format!("material {}", i),
                Channels::new(),
                &defaults,
                layout,
            )
        })
        .collect();
    let model = Model {
        meshes: Arc::new(Vec::new()),
        materials,
    };
    ContainerNode::new(vec![Box::new(ModelNode::from_model(&ctx.device, model))])
}

#[cfg(feature = "integration-tests")]
fn width(material: &Material, channel: MaterialChannel) -> u32 {
    material
        .texture(channel)
        .map(|texture| texture.texture.width())
        .unwrap_or(0)
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_replace_only_described_channels() {
    golden_image_test!(|_: InitContext| {
        TestRender::new(Empty, |_: &mut Context| (), |ctx, _, _| {
            let layout = material_layout(&ctx.device);
            let mut root = model_tree(ctx, &layout, 2);
            let normal = Texture::create_solid(
                [128, 128, 255, 255],
                4,
                4,
                ColorSpace::Linear,
                "normal",
                &ctx.device,
                &ctx.queue,
            );
            let textures: Channels<Texture> =
                [(MaterialChannel::Normal, normal)].into_iter().collect();

            assert_eq!(apply_textures(&mut root, &textures, &ctx.device, &layout), 2);

            let mut seen = 0;
            for_each_material(&mut root, &mut |material: &mut Material| {
                seen += 1;
                assert!(!material.needs_update());
                for channel in MaterialChannel::ALL {
                    let expected = if channel == MaterialChannel::Normal { 4 } else { 1 };
                    assert_eq!(width(material, channel), expected, "{}", channel);
                }
            });
            assert_eq!(seen, 2);
            Ok(ImageTestResult::Passed)
        })
    });
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_leave_materials_alone_without_textures() {
    golden_image_test!(|_: InitContext| {
        TestRender::new(Empty, |_: &mut Context| (), |ctx, _, _| {
            let layout = material_layout(&ctx.device);
            let mut root = model_tree(ctx, &layout, 1);

            assert_eq!(apply_textures(&mut root, &Channels::new(), &ctx.device, &layout), 0);
            for_each_material(&mut root, &mut |material: &mut Material| {
                assert!(!material.needs_update());
                assert!(MaterialChannel::ALL.iter().all(|c| width(material, *c) == 1));
            });

            // A replaced channel stays pending until the bind group is rebuilt.
            for_each_material(&mut root, &mut |material: &mut Material| {
                let glow = Texture::create_solid(
                    [255, 0, 0, 255],
                    2,
                    2,
                    ColorSpace::Srgb,
                    "glow",
                    &ctx.device,
                    &ctx.queue,
                );
                material.set_texture(MaterialChannel::Emissive, glow);
                assert!(material.needs_update());
                material.refresh(&ctx.device, &layout);
                assert!(!material.needs_update());
            });
            Ok(ImageTestResult::Passed)
        })
    });
}

//! Scene graph and hierarchical scene organization.
//!
//! A loaded model is a tree of [`SceneNode`]s. Every node has a local
//! transform relative to its parent and a cached world transform. Nodes that
//! carry geometry ([`ModelNode`]) also own their materials and an instance
//! buffer holding the world matrix.

use log::warn;
use wgpu::{Device, util::DeviceExt};

use crate::{
    data_structures::{
        instance::{Instance, InstanceRaw},
        model::{self, Material},
    },
    render::Instanced,
};

pub trait SceneNode {
    fn get_local_transform(&self) -> &Instance;

    fn set_local_transform(&mut self, instance: Instance);

    fn get_local_transform_mut(&mut self) -> &mut Instance;

    fn get_world_transform(&self) -> &Instance;

    /// Recompute world transforms for this node and its subtree.
    fn update_world_transforms(&mut self, parents_world_transform: &Instance);

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>>;

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>>;

    fn add_child(&mut self, child: Box<dyn SceneNode>);

    /// Materials owned by this node only, not its children.
    fn materials_mut(&mut self) -> &mut [Material];

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device);

    fn get_render(&self) -> Vec<Instanced<'_>>;

    fn update_world_transform_all(&mut self) {
        self.update_world_transforms(&Instance::default());
    }
}

/// Depth-first walk over every node of a subtree, parents before children.
pub fn traverse_mut(node: &mut dyn SceneNode, visit: &mut dyn FnMut(&mut dyn SceneNode)) {
    visit(node);
    for child in node.get_children_mut().iter_mut() {
        traverse_mut(child.as_mut(), visit);
    }
}

/// Visit every material of every mesh in a subtree.
pub fn for_each_material(node: &mut dyn SceneNode, visit: &mut dyn FnMut(&mut Material)) {
    traverse_mut(node, &mut |node| {
        node.materials_mut().iter_mut().for_each(|material| visit(material))
    });
}

pub struct ContainerNode {
    pub children: Vec<Box<dyn SceneNode>>,
    local: Instance,
    world: Instance,
}

impl ContainerNode {
    pub fn new(children: Vec<Box<dyn SceneNode>>) -> Self {
        Self {
            children,
            local: Instance::default(),
            world: Instance::default(),
        }
    }
}

impl SceneNode for ContainerNode {
    fn get_local_transform(&self) -> &Instance {
        &self.local
    }

    fn set_local_transform(&mut self, instance: Instance) {
        self.local = instance;
    }

    fn get_local_transform_mut(&mut self) -> &mut Instance {
        &mut self.local
    }

    fn get_world_transform(&self) -> &Instance {
        &self.world
    }

    fn update_world_transforms(&mut self, parents_world_transform: &Instance) {
        self.world = parents_world_transform * &self.local;
        for child in self.children.iter_mut() {
            child.update_world_transforms(&self.world);
        }
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn materials_mut(&mut self) -> &mut [Material] {
        &mut []
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue, device));
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        self.children
            .iter()
            .flat_map(|child| child.get_render())
            .collect()
    }
}

pub struct ModelNode {
    children: Vec<Box<dyn SceneNode>>,
    instance_buffer: wgpu::Buffer,
    local: Instance,
    world: Instance,
    model: model::Model,
}

impl ModelNode {
    pub fn from_model(device: &Device, model: model::Model) -> Self {
        let world = Instance::default();
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Instance Buffer"),
            contents: bytemuck::cast_slice(&[world.to_raw()]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            children: vec![],
            instance_buffer,
            local: Instance::default(),
            world,
            model,
        }
    }

    pub fn model(&self) -> &model::Model {
        &self.model
    }
}

impl SceneNode for ModelNode {
    fn get_local_transform(&self) -> &Instance {
        &self.local
    }

    fn set_local_transform(&mut self, instance: Instance) {
        self.local = instance;
    }

    fn get_local_transform_mut(&mut self) -> &mut Instance {
        &mut self.local
    }

    fn get_world_transform(&self) -> &Instance {
        &self.world
    }

    fn update_world_transforms(&mut self, parents_world_transform: &Instance) {
        self.world = parents_world_transform * &self.local;
        for child in self.children.iter_mut() {
            child.update_world_transforms(&self.world);
        }
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn materials_mut(&mut self) -> &mut [Material] {
        &mut self.model.materials
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        let raw: [InstanceRaw; 1] = [self.world.to_raw()];
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&raw));
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue, device));
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        self.children
            .iter()
            .flat_map(|child| child.get_render())
            .chain([Instanced {
                instance: &self.instance_buffer,
                model: &self.model,
                amount: 1,
            }])
            .collect()
    }
}

/// Convert a glTF node (and its subtree) into scene nodes.
///
/// Every mesh node receives its own copy of the materials so that textures can
/// later be replaced per node.
pub fn to_scene_node(
    node: gltf::scene::Node,
    buf: &[Vec<u8>],
    device: &wgpu::Device,
    mats: &[model::Material],
) -> Box<dyn SceneNode> {
    let mut scene_node: Box<dyn SceneNode> = match node.mesh() {
        Some(mesh) => {
            let mut meshes = Vec::new();
            for primitive in mesh.primitives() {
                let reader = primitive.reader(|buffer| buf.get(buffer.index()).map(Vec::as_slice));

                let mut vertices: Vec<model::ModelVertex> = match reader.read_positions() {
                    Some(positions) => positions
                        .map(|position| model::ModelVertex {
                            position,
                            ..Default::default()
                        })
                        .collect(),
                    None => {
                        warn!("Primitive {} of mesh {:?} has no positions", primitive.index(), mesh.name());
                        continue;
                    }
                };
                if let Some(normals) = reader.read_normals() {
                    vertices
                        .iter_mut()
                        .zip(normals)
                        .for_each(|(vertex, normal)| vertex.normal = normal);
                }
                if let Some(tex_coords) = reader.read_tex_coords(0).map(|v| v.into_f32()) {
                    vertices
                        .iter_mut()
                        .zip(tex_coords)
                        .for_each(|(vertex, tex_coord)| vertex.tex_coords = tex_coord);
                }
                if let Some(tangents) = reader.read_tangents() {
                    vertices.iter_mut().zip(tangents).for_each(|(vertex, tangent)| {
                        // GLTF represents tangents as vec4 where the 4th elem can be used to calculate the bitangent
                        let tangent: cgmath::Vector4<f32> = tangent.into();
                        let normal: cgmath::Vector3<f32> = vertex.normal.into();
                        vertex.tangent = tangent.truncate().into();
                        vertex.bitangent = (normal.cross(tangent.truncate()) * tangent.w).into();
                    });
                }

                let indices: Vec<u32> = match reader.read_indices() {
                    Some(indices) => indices.into_u32().collect(),
                    None => (0..vertices.len() as u32).collect(),
                };
                let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{:?} Vertex Buffer", mesh.name())),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{:?} Index Buffer", mesh.name())),
                    contents: bytemuck::cast_slice(&indices),
                    usage: wgpu::BufferUsages::INDEX,
                });

                meshes.push(model::Mesh {
                    name: mesh.name().unwrap_or("unknown_mesh").to_string(),
                    vertex_buffer,
                    index_buffer,
                    num_elements: indices.len() as u32,
                    material: primitive.material().index().unwrap_or(0),
                });
            }
            let model = model::Model {
                meshes: std::sync::Arc::new(meshes),
                materials: mats.to_vec(),
            };
            Box::new(ModelNode::from_model(device, model))
        }
        None => Box::new(ContainerNode::new(Vec::new())),
    };
    let (translation, rotation, scale) = node.transform().decomposed();
    scene_node.set_local_transform(Instance {
        position: translation.into(),
        rotation: cgmath::Quaternion::new(rotation[3], rotation[0], rotation[1], rotation[2]),
        scale: scale.into(),
    });
    for child in node.children() {
        let child_node = to_scene_node(child, buf, device, mats);
        scene_node.add_child(child_node);
    }

    scene_node
}

use ultraviolet::{
	rotor::Rotor3,
	vec::{
		Vec3,
		Vec4
	}
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UpAxis {
	Y,
	Z,
}

/// Node identification type
#[derive(Clone, Debug, PartialEq)]
pub enum ObjRef {
	Name(String),
	Number(u32),
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeData {
	Geometry(Mesh),
	Null,
}

/// Base type of the 3D environment
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub id: ObjRef,
	pub data: NodeData,
	pub translation: Vec3,
	pub rotation: Rotor3,
	pub scale: Vec3,
}

impl Node {
	pub fn new(id: ObjRef) -> Node {
		Node {
			id,
			data: NodeData::Null,
			translation: Vec3::zero(),
			rotation: Rotor3::identity(),
			scale: Vec3::one(),
		}
	}

	/// Returns the mesh held by this node, if any
	pub fn mesh(&self) -> Option<&Mesh> {
		match &self.data {
			NodeData::Geometry(mesh) => Some(mesh),
			NodeData::Null => None,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Vertex {
	pub position: Vec4,
	pub normal: Option<Vec3>,
}

impl Vertex {
	/// Creates a vertex at `position` with `w` set to `1`
	pub fn at(position: Vec3) -> Vertex {
		Vertex {
			position: Vec4::new(position.x, position.y, position.z, 1.0),
			normal: None,
		}
	}
}

/// Polygon referencing vertices by their position in [`Mesh::vertices`]
#[derive(Clone, Debug, PartialEq)]
pub enum Face {
	Triangle([usize; 3]),
	Quad([usize; 4]),
	Ngon(Vec<usize>),
}

impl Face {
	/// Picks the tightest representation for a list of vertex indices
	pub fn from_indices(indices: Vec<usize>) -> Face {
		match indices[..] {
			[a, b, c] => Face::Triangle([a, b, c]),
			[a, b, c, d] => Face::Quad([a, b, c, d]),
			_ => Face::Ngon(indices),
		}
	}

	pub fn indices(&self) -> &[usize] {
		match self {
			Face::Triangle(t) => t,
			Face::Quad(q) => q,
			Face::Ngon(n) => n,
		}
	}

	/// Reverses the winding order
	pub fn reverse(&mut self) {
		match self {
			Face::Triangle(t) => t.reverse(),
			Face::Quad(q) => q.reverse(),
			Face::Ngon(n) => n.reverse(),
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
	pub vertices: Vec<Vertex>,
	pub faces: Vec<Face>,
}

/// Top level of the 3D environment
#[derive(Clone, Debug)]
pub struct Scene {
	pub root: Node,
	pub up: UpAxis,
}

impl Scene {
	pub fn new(root: Node) -> Scene {
		Scene {
			root,
			up: UpAxis::Y,
		}
	}
}

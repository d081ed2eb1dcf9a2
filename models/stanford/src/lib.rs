pub mod ply;
pub mod ply_ascii;
pub mod ply_binary;

use bitflags::bitflags;

use ultraviolet::vec::Vec3;

use rgk_core::scene::{
	Face,
	Mesh,
	Vertex
};

#[cfg(feature = "import")]
use rgk_core::scene::{
	Node,
	NodeData,
	ObjRef,
	Scene,
	UpAxis
};

#[cfg(feature = "import")]
use tracing::warn;

use ply::Document;

#[cfg(feature = "import")]
use ply::import::PlyImportError;

bitflags! {
	pub struct ImportFlag: u32 {
		const FLIP_X = 1;
		const FLIP_WINDING = 2;
		const Z_UP = 4;
	}
}

impl Default for ImportFlag {
	fn default() -> Self {
		ImportFlag::empty()
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImportCfg {
	pub flags: ImportFlag,
	/// Per-axis factor applied to vertex positions
	pub scale: Vec3,
}

impl Default for ImportCfg {
	fn default() -> Self {
		Self {
			flags: ImportFlag::default(),
			scale: Vec3::one(),
		}
	}
}

/// Builds a scene mesh from a decoded document. The document is left untouched.
pub fn to_mesh(doc: &Document, cfg: &ImportCfg) -> Mesh {
	let vertices = doc.vertices.iter().map(|&v| {
		let mut position = Vec3::from(v) * cfg.scale;
		if cfg.flags.contains(ImportFlag::FLIP_X) {
			position.x = -position.x;
		}

		Vertex::at(position)
	}).collect();

	let faces = doc.faces.iter().map(|f| {
		let mut face = Face::from_indices(f.indices.iter().map(|&i| i as usize).collect());
		if cfg.flags.contains(ImportFlag::FLIP_WINDING) {
			face.reverse();
		}

		face
	}).collect();

	Mesh {
		vertices,
		faces,
	}
}

/// Loads a PLY file into a scene with a single mesh node
#[cfg(feature = "import")]
#[tracing::instrument(skip(cfg))]
pub fn read(filepath: &str, cfg: ImportCfg) -> Result<Scene, PlyImportError> {
	let doc = Document::open(filepath).map_err(|e| {
		warn!("Failed to import PLY file: {}", e);
		e
	})?;

	let mut root = Node::new(ObjRef::Name(filepath.to_string()));
	root.data = NodeData::Geometry(to_mesh(&doc, &cfg));

	let mut scene = Scene::new(root);
	if cfg.flags.contains(ImportFlag::Z_UP) {
		scene.up = UpAxis::Z;
	}

	Ok(scene)
}

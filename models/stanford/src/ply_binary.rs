/// Three 4-byte floats
pub const VERTEX_SIZE: usize = 12;

/// Faces are stored as a one byte index count followed by that many 4-byte indices.
pub const MAX_FACE_INDICES: usize = u8::MAX as usize;

#[cfg(feature = "import")]
pub mod import {
	use byteorder::{
		LE,
		ReadBytesExt
	};

	use std::io::Cursor;

	use tracing::warn;

	use crate::ply::{
		Face,
		Header,
		import::PlyImportError,
		Vertex
	};

	use super::VERTEX_SIZE;

	type Body<'a> = Cursor<&'a [u8]>;

	fn f32le(buf: &mut Body) -> Result<f32, PlyImportError> {
		let offset = buf.position();
		buf.read_f32::<LE>().map_err(|_| PlyImportError::Truncated { offset, wanted: 4 })
	}

	fn u32le(buf: &mut Body) -> Result<u32, PlyImportError> {
		let offset = buf.position();
		buf.read_u32::<LE>().map_err(|_| PlyImportError::Truncated { offset, wanted: 4 })
	}

	fn byte(buf: &mut Body) -> Result<u8, PlyImportError> {
		let offset = buf.position();
		buf.read_u8().map_err(|_| PlyImportError::Truncated { offset, wanted: 1 })
	}

	impl Vertex {
		fn read_le(buf: &mut Body) -> Result<Vertex, PlyImportError> {
			Ok(Vertex {
				x: f32le(buf)?,
				y: f32le(buf)?,
				z: f32le(buf)?,
			})
		}
	}

	impl Face {
		fn read_le(buf: &mut Body) -> Result<Face, PlyImportError> {
			let count = byte(buf)? as usize;

			let mut indices = Vec::with_capacity(count);
			for _ in 0..count {
				indices.push(u32le(buf)?);
			}

			Ok(Face { indices })
		}
	}

	/// Decodes the declared vertex records, then the declared face records. Every read is
	/// bounds checked; nothing past the end of `data` is touched.
	pub fn body(data: &[u8], header: &Header) -> Result<(Vec<Vertex>, Vec<Face>), PlyImportError> {
		let mut buf = Cursor::new(data);

		let mut vertices = Vec::with_capacity(header.num_vertices.min(data.len() / VERTEX_SIZE));
		for _ in 0..header.num_vertices {
			vertices.push(Vertex::read_le(&mut buf)?);
		}

		let mut faces = Vec::with_capacity(header.num_faces.min(data.len()));
		for _ in 0..header.num_faces {
			faces.push(Face::read_le(&mut buf)?);
		}

		let trailing = (data.len() as u64).saturating_sub(buf.position());
		if trailing > 0 {
			warn!("Ignoring {} bytes after the last face record", trailing);
		}

		Ok((vertices, faces))
	}

}

#[cfg(feature = "export")]
pub mod export {
	use byteorder::{
		LE,
		WriteBytesExt
	};

	use std::io::Write;

	use crate::ply::{
		export::PlyExportError,
		Face,
		Vertex
	};

	use super::MAX_FACE_INDICES;

	/// Fails on the first face whose index count does not fit the one byte count prefix
	pub fn check_arity(faces: &[Face]) -> Result<(), PlyExportError> {
		match faces.iter().position(|f| f.indices.len() > MAX_FACE_INDICES) {
			Some(face) => Err(PlyExportError::FaceArity {
				face,
				len: faces[face].indices.len(),
			}),
			None => Ok(()),
		}
	}

	/// Writes little endian vertex and face records. Nothing is written if a face has too many
	/// indices for its count prefix.
	pub fn body<W>(buf: &mut W, vertices: &[Vertex], faces: &[Face]) -> Result<(), PlyExportError>
	where
		W: Write,
	{
		check_arity(faces)?;

		for v in vertices {
			buf.write_f32::<LE>(v.x)?;
			buf.write_f32::<LE>(v.y)?;
			buf.write_f32::<LE>(v.z)?;
		}

		for f in faces {
			buf.write_u8(f.indices.len() as u8)?;
			for index in f.indices.iter() {
				buf.write_u32::<LE>(*index)?;
			}
		}

		Ok(())
	}

}

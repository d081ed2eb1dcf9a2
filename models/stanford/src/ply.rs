use std::fmt::{
	Display,
	Formatter,
	self
};

use ultraviolet::vec::Vec3;

/// Every PLY file starts with this line.
pub static MAGIC: &[u8] = b"ply\n";

/// Last header keyword. The body starts after the line break that follows it.
pub static END_HEADER: &[u8] = b"end_header";

/// Body encoding declared by the `format` header line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Encoding {
	Ascii,
	BinaryLittleEndian,
	BinaryBigEndian,
	#[default]
	Unknown,
}

impl Display for Encoding {
	/// Display the encoding the way it is spelled in a header
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Encoding::Ascii => "ascii",
			Encoding::BinaryLittleEndian => "binary_little_endian",
			Encoding::BinaryBigEndian => "binary_big_endian",
			Encoding::Unknown => "unknown",
		})
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Header {
	pub encoding: Encoding,
	/// Token following the encoding on the `format` line, usually `1.0`
	pub version: Option<String>,
	pub comments: Vec<String>,
	pub num_vertices: usize,
	pub num_faces: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vertex {
	pub x: f32,
	pub y: f32,
	pub z: f32,
}

impl From<Vertex> for Vec3 {
	fn from(v: Vertex) -> Vec3 {
		Vec3::new(v.x, v.y, v.z)
	}
}

/// Polygon made of indices into [`Document::vertices`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Face {
	pub indices: Vec<u32>,
}

/// Decoded PLY file
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
	pub header: Header,
	pub vertices: Vec<Vertex>,
	pub faces: Vec<Face>,
}

impl Document {
	/// Creates a document that was not decoded from a file. The header declares exactly the
	/// given records and has no encoding.
	pub fn new(vertices: Vec<Vertex>, faces: Vec<Face>) -> Document {
		Document {
			header: Header {
				num_vertices: vertices.len(),
				num_faces: faces.len(),
				..Header::default()
			},
			vertices,
			faces,
		}
	}

	pub fn encoding(&self) -> Encoding {
		self.header.encoding
	}

	pub fn declared_vertex_count(&self) -> usize {
		self.header.num_vertices
	}

	pub fn declared_face_count(&self) -> usize {
		self.header.num_faces
	}

	/// Returns the axis-aligned bounding box of all vertices, or `None` for an empty document
	pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
		self.vertices.iter()
			.map(|&v| Vec3::from(v))
			.fold(None, |bounds, p| match bounds {
				None => Some((p, p)),
				Some((lo, hi)) => Some((lo.min_by_component(p), hi.max_by_component(p))),
			})
	}
}

#[cfg(feature = "import")]
pub mod import {
	use nom::{
		combinator::opt,
		error::Error as NomError,
		sequence::{
			pair,
			preceded
		}
	};

	use std::{
		borrow::Cow,
		fs,
		io::{
			self,
			Read
		},
		path::Path
	};

	use thiserror::Error;
	use tracing::{
		debug,
		info
	};

	use rgk_core::{
		find_bytes,
		nom_ext::{
			keyword,
			token,
			uint,
			ws
		}
	};

	use crate::{
		ply_ascii,
		ply_binary
	};

	use super::*;

	#[derive(Error, Debug)]
	pub enum PlyImportError {
		#[error("I/O error")]
		IO {
			#[from]
			source: io::Error,
		},
		#[error("Not a PLY file")]
		Magic,
		#[error("Missing header terminator")]
		EndHeader,
		#[error("Malformed header: no line break after end_header")]
		HeaderLineEnd,
		#[error("Unrecognized format: {0:?}")]
		Format(String),
		#[error("Unsupported or missing format")]
		MissingFormat,
		#[error("Unsupported encoding: {0}")]
		Encoding(Encoding),
		#[error("Invalid {element} count on header line {line}")]
		Count {
			element: &'static str,
			line: usize,
		},
		#[error("Invalid {element} record on line {line}")]
		Record {
			element: &'static str,
			line: usize,
		},
		#[error("Unexpected end of data at line {line}")]
		UnexpectedEnd {
			line: usize,
		},
		#[error("Truncated binary data: {wanted} bytes needed at body offset {offset}")]
		Truncated {
			offset: u64,
			wanted: usize,
		},
		#[error("Face {face} references vertex {index}, but there are only {count} vertices")]
		FaceIndex {
			face: usize,
			index: u32,
			count: usize,
		},
	}

	/// Input split into header text and body bytes
	#[derive(Clone, Debug, PartialEq)]
	pub struct Container<'a> {
		/// Everything up to, not including, the line break after `end_header`
		pub header: Cow<'a, str>,
		pub data: &'a [u8],
		/// Number of lines before the body, used to number body lines
		pub header_lines: usize,
	}

	/// Finds the header markers and splits `input` at the line break following `end_header`
	pub fn locate(input: &[u8]) -> Result<Container<'_>, PlyImportError> {
		if !input.starts_with(MAGIC) {
			return Err(PlyImportError::Magic);
		}

		let end = find_bytes(input, END_HEADER, MAGIC.len()).ok_or(PlyImportError::EndHeader)?;
		let split = find_bytes(input, b"\n", end + END_HEADER.len())
			.ok_or(PlyImportError::HeaderLineEnd)?;

		let (header, data) = input.split_at(split);

		Ok(Container {
			header: String::from_utf8_lossy(header),
			data: &data[1..],
			header_lines: header.iter().filter(|&&b| b == b'\n').count() + 1,
		})
	}

	/// Parses the remainder of an `element <name>` line as a record count
	fn count(rest: &str, element: &'static str, line: usize) -> Result<usize, PlyImportError> {
		uint::<NomError<&str>>(rest)
			.map(|(_, n)| n)
			.map_err(|_| PlyImportError::Count { element, line })
	}

	impl Header {
		/// Parses header text. Lines are dispatched by their leading keywords; anything other
		/// than `format`, `element vertex`, `element face` and `comment` is skipped.
		pub fn parse(text: &str) -> Result<Header, PlyImportError> {
			let mut header = Header::default();

			for (i, line) in text.lines().enumerate() {
				let line_no = i + 1;
				let line = line.trim_start();

				if let Ok((rest, _)) = keyword::<NomError<&str>>("format")(line) {
					let (_, (name, version)) = pair(opt(ws(token::<NomError<&str>>)), opt(ws(token)))(rest)
						.map_err(|_| PlyImportError::Format(rest.trim().to_string()))?;

					header.encoding = match name {
						Some("ascii") => Encoding::Ascii,
						Some("binary_little_endian") => Encoding::BinaryLittleEndian,
						Some("binary_big_endian") => Encoding::BinaryBigEndian,
						other => return Err(PlyImportError::Format(other.unwrap_or_default().to_string())),
					};
					header.version = version.map(str::to_string);
				} else if let Ok((rest, _)) = preceded(keyword::<NomError<&str>>("element"), ws(keyword("vertex")))(line) {
					header.num_vertices = count(rest, "vertex", line_no)?;
				} else if let Ok((rest, _)) = preceded(keyword::<NomError<&str>>("element"), ws(keyword("face")))(line) {
					header.num_faces = count(rest, "face", line_no)?;
				} else if let Ok((rest, _)) = keyword::<NomError<&str>>("comment")(line) {
					header.comments.push(rest.trim().to_string());
				}
			}

			Ok(header)
		}
	}

	/// Returns the first face holding an index outside of the vertex list
	fn check_indices(faces: &[Face], count: usize) -> Result<(), PlyImportError> {
		for (face, f) in faces.iter().enumerate() {
			if let Some(&index) = f.indices.iter().find(|&&index| index as usize >= count) {
				return Err(PlyImportError::FaceIndex { face, index, count });
			}
		}

		Ok(())
	}

	impl Document {
		/// Decodes a complete in-memory PLY file
		pub fn from_bytes(input: &[u8]) -> Result<Document, PlyImportError> {
			let container = locate(input)?;
			let header = Header::parse(&container.header)?;

			debug!(encoding = %header.encoding, vertices = header.num_vertices, faces = header.num_faces,
				"Parsed PLY header");

			let (vertices, faces) = match header.encoding {
				Encoding::Ascii => ply_ascii::import::body(container.data, &header, container.header_lines)?,
				Encoding::BinaryLittleEndian => ply_binary::import::body(container.data, &header)?,
				Encoding::BinaryBigEndian => return Err(PlyImportError::Encoding(header.encoding)),
				Encoding::Unknown => return Err(PlyImportError::MissingFormat),
			};

			check_indices(&faces, vertices.len())?;

			info!("PLY body decoded: {} vertices, {} faces", vertices.len(), faces.len());

			Ok(Document {
				header,
				vertices,
				faces,
			})
		}

		/// Reads `reader` to the end, then decodes it
		pub fn read<R>(reader: &mut R) -> Result<Document, PlyImportError>
		where
			R: Read,
		{
			let mut input = vec![];
			reader.read_to_end(&mut input)?;

			Document::from_bytes(&input)
		}

		#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
		pub fn open<P>(path: P) -> Result<Document, PlyImportError>
		where
			P: AsRef<Path>,
		{
			let input = fs::read(path.as_ref())?;
			debug!("Read {} bytes", input.len());

			Document::from_bytes(&input)
		}
	}

	#[cfg(test)]
	mod tests {
		use super::*;

		const CUBE_HEADER: &str = "ply\nformat ascii 1.0\ncomment made by hand\nelement vertex 8\n\
			property float x\nproperty float y\nproperty float z\nelement face 6\n\
			property list uchar int vertex_indices\nend_header\n";

		#[test]
		fn test_locate() {
			let input = b"ply\nformat ascii 1.0\nend_header\n0 0 0\n";
			let container = locate(input).unwrap();

			assert_eq!(container.header, "ply\nformat ascii 1.0\nend_header");
			assert_eq!(container.data, b"0 0 0\n");
			assert_eq!(container.header_lines, 3);
		}

		#[test]
		fn test_locate_binary_body() {
			let mut input = b"ply\nformat binary_little_endian 1.0\nend_header\r\n".to_vec();
			input.extend_from_slice(&[0x0a, 0x00, 0xff]);
			let container = locate(&input).unwrap();

			assert_eq!(container.header, "ply\nformat binary_little_endian 1.0\nend_header\r");
			assert_eq!(container.data, &[0x0au8, 0x00, 0xff][..]);
		}

		#[test]
		fn test_locate_errors() {
			assert!(matches!(locate(b"PLY\nend_header\n"), Err(PlyImportError::Magic)));
			assert!(matches!(locate(b" ply\nend_header\n"), Err(PlyImportError::Magic)));
			assert!(matches!(locate(b"pl"), Err(PlyImportError::Magic)));
			assert!(matches!(locate(b"ply\nformat ascii 1.0\n"), Err(PlyImportError::EndHeader)));
			assert!(matches!(locate(b"ply\nformat ascii 1.0\nend_header"), Err(PlyImportError::HeaderLineEnd)));
		}

		#[test]
		fn test_header() {
			let header = Header::parse(CUBE_HEADER).unwrap();

			assert_eq!(header.encoding, Encoding::Ascii);
			assert_eq!(header.version.as_deref(), Some("1.0"));
			assert_eq!(header.comments, vec!["made by hand".to_string()]);
			assert_eq!(header.num_vertices, 8);
			assert_eq!(header.num_faces, 6);
		}

		#[test]
		fn test_header_whitespace() {
			let header = Header::parse("ply\r\nformat   binary_little_endian 1.0\r\nelement  vertex   4327\r\n\
				element face 12 extra\r\n\r\nend_header").unwrap();

			assert_eq!(header.encoding, Encoding::BinaryLittleEndian);
			assert_eq!(header.num_vertices, 4327);
			assert_eq!(header.num_faces, 12);
		}

		#[test]
		fn test_header_ignores_other_elements() {
			let header = Header::parse("ply\nformat ascii 1.0\nelement vertex 3\nelement vertex_color 9\n\
				element edge x\nelement face 1\nend_header").unwrap();

			assert_eq!(header.num_vertices, 3);
			assert_eq!(header.num_faces, 1);
		}

		#[test]
		fn test_header_errors() {
			assert!(matches!(Header::parse("ply\nformat utf8 1.0\nend_header"),
				Err(PlyImportError::Format(f)) if f == "utf8"));
			assert!(matches!(Header::parse("ply\nformat\nend_header"),
				Err(PlyImportError::Format(f)) if f.is_empty()));
			assert!(matches!(Header::parse("ply\nformat ascii 1.0\nelement vertex many\nend_header"),
				Err(PlyImportError::Count { element: "vertex", line: 3 })));
			assert!(matches!(Header::parse("ply\nformat ascii 1.0\nelement face -1\nend_header"),
				Err(PlyImportError::Count { element: "face", line: 3 })));
		}

		#[test]
		fn test_header_without_format() {
			let header = Header::parse("ply\nelement vertex 1\nend_header").unwrap();
			assert_eq!(header.encoding, Encoding::Unknown);

			let input = b"ply\nelement vertex 0\nend_header\n";
			assert!(matches!(Document::from_bytes(input), Err(PlyImportError::MissingFormat)));
		}

		#[test]
		fn test_example_document() {
			let input = b"ply\nformat ascii 1.0\nelement vertex 2\nelement face 1\nend_header\n\
				0 0 0\n1 1 1\n3 0 1 0\n";
			let doc = Document::from_bytes(input).unwrap();

			assert_eq!(doc.vertices, vec![
				Vertex { x: 0.0, y: 0.0, z: 0.0 },
				Vertex { x: 1.0, y: 1.0, z: 1.0 },
			]);
			assert_eq!(doc.faces, vec![Face { indices: vec![0, 1, 0] }]);
			assert_eq!(doc.declared_vertex_count(), 2);
			assert_eq!(doc.declared_face_count(), 1);
		}

		#[test]
		fn test_cube() {
			let body = "0 0 0\n1 0 0\n1 1 0\n0 1 0\n0 0 1\n1 0 1\n1 1 1\n0 1 1\n\
				4 0 3 2 1\n4 4 5 6 7\n4 0 1 5 4\n4 1 2 6 5\n4 2 3 7 6\n4 3 0 4 7\n";
			let input = [CUBE_HEADER, body].concat();
			let doc = Document::from_bytes(input.as_bytes()).unwrap();

			assert_eq!(doc.encoding(), Encoding::Ascii);
			assert_eq!(doc.vertices.len(), 8);
			assert_eq!(doc.faces.len(), 6);
			assert!(doc.faces.iter().all(|f| f.indices.len() == 4));
			assert_eq!(doc.bounds(), Some((Vec3::zero(), Vec3::one())));
		}

		#[test]
		fn test_empty_document() {
			for format in ["ascii", "binary_little_endian"] {
				let input = format!("ply\nformat {} 1.0\nelement vertex 0\nelement face 0\nend_header\n", format);
				let doc = Document::from_bytes(input.as_bytes()).unwrap();

				assert!(doc.vertices.is_empty());
				assert!(doc.faces.is_empty());
				assert_eq!(doc.bounds(), None);
			}
		}

		#[test]
		fn test_big_endian_unsupported() {
			let input = b"ply\nformat binary_big_endian 1.0\nelement vertex 1\nend_header\n\
				\x3f\x80\x00\x00\x3f\x80\x00\x00\x3f\x80\x00\x00";
			let err = Document::from_bytes(input).unwrap_err();

			assert!(matches!(err, PlyImportError::Encoding(Encoding::BinaryBigEndian)));
			assert_eq!(err.to_string(), "Unsupported encoding: binary_big_endian");
		}

		#[test]
		fn test_face_index_out_of_range() {
			let input = b"ply\nformat ascii 1.0\nelement vertex 2\nelement face 2\nend_header\n\
				0 0 0\n1 1 1\n2 0 1\n3 0 1 2\n";

			assert!(matches!(Document::from_bytes(input),
				Err(PlyImportError::FaceIndex { face: 1, index: 2, count: 2 })));
		}

		#[test]
		fn test_read() {
			let input = b"ply\nformat ascii 1.0\nelement vertex 1\nelement face 0\nend_header\n1.5 -2 3e2\n";
			let doc = Document::read(&mut &input[..]).unwrap();

			assert_eq!(doc.vertices, vec![Vertex { x: 1.5, y: -2.0, z: 300.0 }]);
		}

		#[test]
		fn test_open_missing_file() {
			let path = std::env::temp_dir().join("rgk-stanford-does-not-exist.ply");
			assert!(matches!(Document::open(path), Err(PlyImportError::IO { .. })));
		}
	}
}

#[cfg(feature = "export")]
pub mod export {
	use std::io::{
		self,
		Write
	};

	use thiserror::Error;

	use crate::{
		ply_ascii,
		ply_binary
	};

	use super::*;

	#[derive(Error, Debug)]
	pub enum PlyExportError {
		#[error("I/O error")]
		IO {
			#[from]
			source: io::Error,
		},
		#[error("Unsupported encoding: {0}")]
		Encoding(Encoding),
		#[error("Face {face} has {len} indices, binary records hold at most 255")]
		FaceArity {
			face: usize,
			len: usize,
		},
	}

	impl Document {
		/// Writes a header declaring exactly the records held by this document
		fn write_header<W>(&self, buf: &mut W, encoding: Encoding) -> io::Result<()>
		where
			W: Write,
		{
			buf.write_all(MAGIC)?;
			writeln!(buf, "format {} 1.0", encoding)?;
			for comment in self.header.comments.iter().flat_map(|c| c.lines()) {
				writeln!(buf, "comment {}", comment)?;
			}
			writeln!(buf, "element vertex {}", self.vertices.len())?;
			writeln!(buf, "property float x")?;
			writeln!(buf, "property float y")?;
			writeln!(buf, "property float z")?;
			writeln!(buf, "element face {}", self.faces.len())?;
			writeln!(buf, "property list uchar int vertex_indices")?;
			buf.write_all(END_HEADER)?;
			writeln!(buf)
		}

		pub fn write<W>(&self, buf: &mut W, encoding: Encoding) -> Result<(), PlyExportError>
		where
			W: Write,
		{
			match encoding {
				Encoding::Ascii => {
					self.write_header(buf, encoding)?;
					ply_ascii::export::body(buf, &self.vertices, &self.faces)?;
				},
				Encoding::BinaryLittleEndian => {
					ply_binary::export::check_arity(&self.faces)?;
					self.write_header(buf, encoding)?;
					ply_binary::export::body(buf, &self.vertices, &self.faces)?;
				},
				Encoding::BinaryBigEndian | Encoding::Unknown => return Err(PlyExportError::Encoding(encoding)),
			}

			Ok(())
		}

		pub fn to_bytes(&self, encoding: Encoding) -> Result<Vec<u8>, PlyExportError> {
			let mut out = vec![];
			self.write(&mut out, encoding)?;

			Ok(out)
		}
	}

}

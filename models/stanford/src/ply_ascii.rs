#[cfg(feature = "import")]
pub mod import {
	use std::str::from_utf8;

	use tracing::debug;

	use crate::ply::{
		Face,
		Header,
		import::PlyImportError,
		Vertex
	};

	/// Body lines, numbered from the start of the file
	struct Lines<'a> {
		data: &'a [u8],
		pos: usize,
		line: usize,
	}

	impl<'a> Lines<'a> {
		fn new(data: &'a [u8], header_lines: usize) -> Lines<'a> {
			Lines {
				data,
				pos: 0,
				line: header_lines,
			}
		}

		/// Returns the next line number and text without its line break
		fn next_line(&mut self, element: &'static str) -> Result<(usize, &'a str), PlyImportError> {
			let rest = match self.data.get(self.pos..) {
				Some(rest) if !rest.is_empty() => rest,
				_ => return Err(PlyImportError::UnexpectedEnd { line: self.line + 1 }),
			};

			let len = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
			self.pos += len + 1;
			self.line += 1;

			let raw = &rest[..len];
			let raw = raw.strip_suffix(b"\r").unwrap_or(raw);

			from_utf8(raw)
				.map(|text| (self.line, text))
				.map_err(|_| PlyImportError::Record { element, line: self.line })
		}

		/// Returns whatever follows the last line handed out
		fn remaining(&self) -> &'a [u8] {
			self.data.get(self.pos..).unwrap_or_default()
		}
	}

	fn vertex(text: &str, line: usize) -> Result<Vertex, PlyImportError> {
		let mut fields = text.split_ascii_whitespace().map(str::parse::<f32>);
		let mut coord = || match fields.next() {
			Some(Ok(value)) => Ok(value),
			_ => Err(PlyImportError::Record { element: "vertex", line }),
		};

		Ok(Vertex {
			x: coord()?,
			y: coord()?,
			z: coord()?,
		})
	}

	/// Parses `n i0 i1 .. in-1`; fields after the last index are ignored
	fn face(text: &str, line: usize) -> Result<Face, PlyImportError> {
		let invalid = || PlyImportError::Record { element: "face", line };
		let mut fields = text.split_ascii_whitespace();

		let count = fields.next()
			.and_then(|field| field.parse::<usize>().ok())
			.ok_or_else(invalid)?;

		let indices = fields.take(count)
			.map(|field| field.parse::<u32>().map_err(|_| invalid()))
			.collect::<Result<Vec<_>, _>>()?;

		if indices.len() != count {
			return Err(invalid());
		}

		Ok(Face { indices })
	}

	/// Decodes the declared vertex lines, then the declared face lines. `header_lines` is the
	/// number of lines preceding `data` and only serves error reporting.
	pub fn body(data: &[u8], header: &Header, header_lines: usize) -> Result<(Vec<Vertex>, Vec<Face>), PlyImportError> {
		let mut lines = Lines::new(data, header_lines);

		// Shortest possible records are "0 0 0\n" and "0\n"
		let mut vertices = Vec::with_capacity(header.num_vertices.min(data.len() / 6));
		for _ in 0..header.num_vertices {
			let (line, text) = lines.next_line("vertex")?;
			vertices.push(vertex(text, line)?);
		}

		let mut faces = Vec::with_capacity(header.num_faces.min(data.len() / 2));
		for _ in 0..header.num_faces {
			let (line, text) = lines.next_line("face")?;
			faces.push(face(text, line)?);
		}

		if lines.remaining().iter().any(|b| !b.is_ascii_whitespace()) {
			debug!("Ignoring {} bytes after the last face line", lines.remaining().len());
		}

		Ok((vertices, faces))
	}

}

#[cfg(feature = "export")]
pub mod export {
	use std::io::{
		Result,
		Write
	};

	use crate::ply::{
		Face,
		Vertex
	};

	/// Writes one line per vertex, then one line per face. Floats use the shortest
	/// representation that parses back to the same value.
	pub fn body<W>(buf: &mut W, vertices: &[Vertex], faces: &[Face]) -> Result<()>
	where
		W: Write,
	{
		for v in vertices {
			writeln!(buf, "{} {} {}", v.x, v.y, v.z)?;
		}

		for f in faces {
			write!(buf, "{}", f.indices.len())?;
			for index in f.indices.iter() {
				write!(buf, " {}", index)?;
			}
			writeln!(buf)?;
		}

		Ok(())
	}
}

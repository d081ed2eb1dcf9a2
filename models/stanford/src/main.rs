use std::{
	env,
	error::Error,
	fs::File,
	io::{
		BufWriter,
		Write
	},
	process::ExitCode
};

use tracing::info;
use tracing_subscriber::EnvFilter;

use rgk_models_stanford::ply::{
	Document,
	Encoding
};

fn run(input: &str, output: Option<&str>) -> Result<(), Box<dyn Error>> {
	let doc = Document::open(input)?;

	println!("encoding: {} {}", doc.encoding(), doc.header.version.as_deref().unwrap_or(""));
	for comment in doc.header.comments.iter() {
		println!("comment: {}", comment);
	}
	println!("vertices: {}", doc.declared_vertex_count());
	println!("faces: {}", doc.declared_face_count());

	if let Some((lo, hi)) = doc.bounds() {
		println!("bounds: ({}, {}, {}) .. ({}, {}, {})", lo.x, lo.y, lo.z, hi.x, hi.y, hi.z);
	}

	if let Some(output) = output {
		let mut buf = BufWriter::new(File::create(output)?);
		doc.write(&mut buf, Encoding::Ascii)?;
		buf.flush()?;
		info!("Wrote ASCII copy to {}", output);
	}

	Ok(())
}

fn main() -> ExitCode {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let args: Vec<String> = env::args().collect();
	let input = match args.get(1) {
		Some(input) => input,
		None => {
			eprintln!("usage: ply-info <input.ply> [output.ply]");
			return ExitCode::FAILURE;
		},
	};

	match run(input, args.get(2).map(String::as_str)) {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			eprintln!("error: {}", e);
			ExitCode::FAILURE
		},
	}
}

#[cfg(feature = "nom_ext")]
pub mod nom_ext;

pub mod scene;

/// Finds the first occurrence of `needle` in `haystack` at or after `start`.
/// An empty needle never matches.
pub fn find_bytes(haystack: &[u8], needle: &[u8], start: usize) -> Option<usize> {
	if needle.is_empty() || start >= haystack.len() {
		return None;
	}

	haystack[start..].windows(needle.len())
		.position(|window| window == needle)
		.map(|i| i + start)
}

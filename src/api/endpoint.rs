//! Endpoint path helpers.

/// Strip leading slashes so `/dosen` and `dosen` share one cache key.
pub fn normalize(endpoint: &str) -> &str {
  endpoint.trim_start_matches('/')
}

/// The first path component of an endpoint, the unit of cache invalidation.
///
/// A query string ends the segment as well: `dosen?page=2` belongs to `dosen`.
pub fn resource_segment(endpoint: &str) -> &str {
  let endpoint = normalize(endpoint);
  let end = endpoint.find(['/', '?']).unwrap_or(endpoint.len());
  &endpoint[..end]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_normalize() {
    assert_eq!(normalize("/dosen"), "dosen");
    assert_eq!(normalize("dosen/1/10"), "dosen/1/10");
    assert_eq!(normalize(""), "");
  }

  #[test]
  fn test_resource_segment() {
    assert_eq!(resource_segment("dosen/1/10"), "dosen");
    assert_eq!(resource_segment("/data_dosen"), "data_dosen");
    assert_eq!(resource_segment("mk_genap?smt=2"), "mk_genap");
    assert_eq!(resource_segment("ruang"), "ruang");
  }
}

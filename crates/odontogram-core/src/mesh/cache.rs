//! Memoized tooth meshes.
//!
//! Generation is pure, so meshes are cached by everything that feeds it.
//! Misses in a batch are generated in parallel with rayon; each tooth is
//! independent and nothing is shared while generating.

use std::collections::HashMap;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use super::{generate_tooth, MeshConfig, MeshResult, ToothMesh};
use crate::anatomy::ToothDimensions;
use crate::taxonomy::ToothKind;

/// One mesh request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshRequest {
    pub kind: ToothKind,
    pub dimensions: ToothDimensions,
    pub seed: u32,
}

impl MeshRequest {
    pub fn key(&self) -> MeshKey {
        MeshKey {
            kind: self.kind,
            width: self.dimensions.width.to_bits(),
            depth: self.dimensions.depth.to_bits(),
            crown_height: self.dimensions.crown_height.to_bits(),
            seed: self.seed,
        }
    }
}

/// Exact cache key; dimensions are compared bit for bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshKey {
    pub kind: ToothKind,
    pub width: u32,
    pub depth: u32,
    pub crown_height: u32,
    pub seed: u32,
}

/// Cache of generated meshes for one mesh configuration.
#[derive(Debug)]
pub struct MeshCache {
    config: MeshConfig,
    meshes: HashMap<MeshKey, Arc<ToothMesh>>,
    hits: u64,
    misses: u64,
}

impl MeshCache {
    pub fn new(config: MeshConfig) -> Self {
        Self {
            config,
            meshes: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    /// Cached mesh for a request, generating it on a miss.
    pub fn get(&mut self, request: MeshRequest) -> MeshResult<Arc<ToothMesh>> {
        let key = request.key();
        if let Some(mesh) = self.meshes.get(&key) {
            self.hits += 1;
            return Ok(Arc::clone(mesh));
        }
        self.misses += 1;
        self.insert(request)
    }

    /// Meshes for a batch of requests, in request order. Misses are
    /// generated in parallel.
    pub fn get_many(&mut self, requests: &[MeshRequest]) -> MeshResult<Vec<Arc<ToothMesh>>> {
        let mut missing: Vec<MeshRequest> = Vec::new();
        for request in requests {
            let key = request.key();
            if !self.meshes.contains_key(&key) && !missing.iter().any(|m| m.key() == key) {
                missing.push(*request);
            }
        }

        if !missing.is_empty() {
            let config = &self.config;
            let generated: Vec<MeshResult<(MeshKey, ToothMesh)>> = missing
                .par_iter()
                .map(|request| {
                    generate_tooth(request.kind, request.dimensions, request.seed, config)
                        .map(|mesh| (request.key(), mesh))
                })
                .collect();

            for result in generated {
                let (key, mesh) = result?;
                self.meshes.insert(key, Arc::new(mesh));
            }
        }

        self.misses += missing.len() as u64;
        self.hits += (requests.len() - missing.len()) as u64;
        debug!(
            requested = requests.len(),
            generated = missing.len(),
            cached = self.meshes.len(),
            "mesh batch resolved"
        );

        let mut meshes = Vec::with_capacity(requests.len());
        for request in requests {
            let mesh = match self.meshes.get(&request.key()) {
                Some(mesh) => Arc::clone(mesh),
                None => self.insert(*request)?,
            };
            meshes.push(mesh);
        }
        Ok(meshes)
    }

    fn insert(&mut self, request: MeshRequest) -> MeshResult<Arc<ToothMesh>> {
        let mesh = Arc::new(generate_tooth(
            request.kind,
            request.dimensions,
            request.seed,
            &self.config,
        )?);
        self.meshes.insert(request.key(), Arc::clone(&mesh));
        Ok(mesh)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// (hits, misses) since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    pub fn clear(&mut self) {
        self.meshes.clear();
    }
}

//! Asset registry resolving sprite keys to texture paths.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{bail, Context, Result};
use harbor_defence_core::{EffectKind, Species};

use crate::{Aura, SpriteKey};

const SUPPORTED_MANIFEST_VERSION: u32 = 1;

/// Texture paths for every sprite the presentation layer can request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetRegistry {
    paths: HashMap<SpriteKey, PathBuf>,
}

impl AssetRegistry {
    /// Returns the default manifest path relative to the repository root.
    #[must_use]
    pub fn default_manifest_path() -> PathBuf {
        PathBuf::from("assets/manifest.toml")
    }

    /// Loads the manifest at `path`, resolving textures relative to its directory.
    pub fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self> {
        let manifest_path = path.as_ref();
        let contents = fs::read_to_string(manifest_path).with_context(|| {
            format!(
                "failed to read asset manifest at {}",
                manifest_path.display()
            )
        })?;
        let base = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::from_manifest_str(&contents, &base)
    }

    /// Parses manifest contents, resolving textures relative to `base`.
    ///
    /// Every species, effect kind and aura must be listed, and every hideable
    /// species must also provide a submerged texture.
    pub fn from_manifest_str(contents: &str, base: &Path) -> Result<Self> {
        let manifest: Manifest =
            toml::from_str(contents).context("failed to parse asset manifest toml contents")?;
        if manifest.version != SUPPORTED_MANIFEST_VERSION {
            bail!(
                "unsupported asset manifest version {}; expected {}",
                manifest.version,
                SUPPORTED_MANIFEST_VERSION
            );
        }

        let mut paths = HashMap::new();
        insert_section(&mut paths, base, "species", manifest.species, |name| {
            Ok(SpriteKey::Species(Species::from_str(name)?))
        })?;
        insert_section(&mut paths, base, "submerged", manifest.submerged, |name| {
            let species = Species::from_str(name)?;
            if !species.profile().can_hide {
                bail!("species `{species}` cannot submerge");
            }
            Ok(SpriteKey::Submerged(species))
        })?;
        insert_section(&mut paths, base, "effects", manifest.effects, |name| {
            Ok(SpriteKey::Effect(EffectKind::from_str(name)?))
        })?;
        insert_section(&mut paths, base, "auras", manifest.auras, |name| {
            Ok(SpriteKey::Aura(Aura::from_str(name)?))
        })?;

        for key in required_keys() {
            if !paths.contains_key(&key) {
                bail!("asset manifest missing entry for {key:?}");
            }
        }

        Ok(Self { paths })
    }

    /// Texture path registered for the key.
    #[must_use]
    pub fn path(&self, key: SpriteKey) -> Option<&Path> {
        self.paths.get(&key).map(PathBuf::as_path)
    }

    /// Texture path registered for the key, failing when it is missing.
    pub fn resolve(&self, key: SpriteKey) -> Result<&Path> {
        self.path(key)
            .with_context(|| format!("sprite {key:?} missing from asset registry"))
    }

    /// Number of registered textures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Reports whether the registry holds no textures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    version: u32,
    species: BTreeMap<String, String>,
    #[serde(default)]
    submerged: BTreeMap<String, String>,
    effects: BTreeMap<String, String>,
    auras: BTreeMap<String, String>,
}

fn insert_section(
    paths: &mut HashMap<SpriteKey, PathBuf>,
    base: &Path,
    section: &str,
    entries: BTreeMap<String, String>,
    parse_key: impl Fn(&str) -> Result<SpriteKey>,
) -> Result<()> {
    for (name, relative_path) in entries {
        let key = parse_key(&name)
            .with_context(|| format!("invalid key `{name}` in [{section}] of asset manifest"))?;
        if paths.insert(key, base.join(relative_path)).is_some() {
            bail!("asset manifest contains duplicate entry for {key:?}");
        }
    }
    Ok(())
}

fn required_keys() -> impl Iterator<Item = SpriteKey> {
    let species = Species::ALL.into_iter().map(SpriteKey::Species);
    let submerged = Species::ALL
        .into_iter()
        .filter(|species| species.profile().can_hide)
        .map(SpriteKey::Submerged);
    let effects = EffectKind::ALL.into_iter().map(SpriteKey::Effect);
    let auras = Aura::ALL.into_iter().map(SpriteKey::Aura);
    species.chain(submerged).chain(effects).chain(auras)
}

//! POM parsing: the subset needed to read a Maven artifact's direct
//! dependencies (declarations, parent chain, dependency management, and
//! `${property}` interpolation).

use std::collections::BTreeMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use javelin_util::errors::{JavelinError, JavelinResult};

/// A parsed POM, reduced to dependency-bearing content.
#[derive(Debug, Clone, Default)]
pub struct Pom {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub parent: Option<ParentRef>,
    pub properties: BTreeMap<String, String>,
    pub dependencies: Vec<PomDependency>,
    pub dependency_management: Vec<PomDependency>,
}

/// Reference to a parent POM.
#[derive(Debug, Clone)]
pub struct ParentRef {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

/// A dependency declared in a POM file.
#[derive(Debug, Clone, Default)]
pub struct PomDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub scope: Option<String>,
    pub optional: bool,
    pub classifier: Option<String>,
    pub exclusions: Vec<PomExclusion>,
}

/// An exclusion within a dependency declaration. A missing artifact id
/// excludes the whole group.
#[derive(Debug, Clone, Default)]
pub struct PomExclusion {
    pub group_id: String,
    pub artifact_id: Option<String>,
}

impl Pom {
    /// Effective group id (falls back to parent).
    pub fn effective_group_id(&self) -> Option<&str> {
        self.group_id
            .as_deref()
            .or(self.parent.as_ref().map(|p| p.group_id.as_str()))
    }

    /// Effective version (falls back to parent).
    pub fn effective_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .or(self.parent.as_ref().map(|p| p.version.as_str()))
    }

    /// Resolve `${property}` references in dependency coordinates using POM
    /// properties and the built-in project variables.
    pub fn resolve_properties(&mut self) {
        let snapshot = self.clone();
        for dep in self
            .dependencies
            .iter_mut()
            .chain(self.dependency_management.iter_mut())
        {
            dep.group_id = snapshot.interpolate(&dep.group_id);
            dep.artifact_id = snapshot.interpolate(&dep.artifact_id);
            if let Some(ref v) = dep.version {
                dep.version = Some(snapshot.interpolate(v));
            }
        }
    }

    fn interpolate(&self, input: &str) -> String {
        let mut result = input.to_string();
        for _ in 0..20 {
            let Some(start) = result.find("${") else { break };
            let Some(len) = result[start..].find('}') else { break };
            let key = &result[start + 2..start + len];
            match self.lookup_property(key) {
                Some(value) => {
                    result = format!("{}{}{}", &result[..start], value, &result[start + len + 1..]);
                }
                None => break,
            }
        }
        result
    }

    fn lookup_property(&self, key: &str) -> Option<String> {
        match key {
            "project.groupId" | "pom.groupId" => {
                self.effective_group_id().map(|s| s.to_string())
            }
            "project.artifactId" | "pom.artifactId" => self.artifact_id.clone(),
            "project.version" | "pom.version" => self.effective_version().map(|s| s.to_string()),
            "project.parent.groupId" => self.parent.as_ref().map(|p| p.group_id.clone()),
            "project.parent.version" => self.parent.as_ref().map(|p| p.version.clone()),
            _ => self.properties.get(key).cloned(),
        }
    }

    /// Merge a parent POM's properties and dependency management into this
    /// POM; local declarations dominate.
    pub fn apply_parent(&mut self, parent: &Pom) {
        for (k, v) in &parent.properties {
            self.properties.entry(k.clone()).or_insert_with(|| v.clone());
        }
        if self.group_id.is_none() {
            self.group_id = parent.effective_group_id().map(|s| s.to_string());
        }
        if self.version.is_none() {
            self.version = parent.effective_version().map(|s| s.to_string());
        }
        for dm in &parent.dependency_management {
            let dominated = self
                .dependency_management
                .iter()
                .any(|d| d.group_id == dm.group_id && d.artifact_id == dm.artifact_id);
            if !dominated {
                self.dependency_management.push(dm.clone());
            }
        }
    }

    /// Look up a version from dependency management for `group:artifact`.
    pub fn managed_version(&self, group_id: &str, artifact_id: &str) -> Option<&str> {
        self.dependency_management
            .iter()
            .find(|d| d.group_id == group_id && d.artifact_id == artifact_id)
            .and_then(|d| d.version.as_deref())
    }
}

/// Parse a POM XML string.
pub fn parse_pom(xml: &str) -> JavelinResult<Pom> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut pom = Pom::default();
    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut dep: Option<PomDependency> = None;
    let mut exclusion: Option<PomExclusion> = None;
    let mut parent: Option<ParentRef> = None;
    let mut in_dep_mgmt = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                path.push(String::from_utf8_lossy(e.name().as_ref()).to_string());
                text.clear();
                match context(&path).as_str() {
                    "project>dependencies>dependency" => {
                        in_dep_mgmt = false;
                        dep = Some(PomDependency::default());
                    }
                    "project>dependencyManagement>dependencies>dependency" => {
                        in_dep_mgmt = true;
                        dep = Some(PomDependency::default());
                    }
                    ctx if ctx.ends_with(">exclusions>exclusion") && dep.is_some() => {
                        exclusion = Some(PomExclusion::default());
                    }
                    "project>parent" => {
                        parent = Some(ParentRef {
                            group_id: String::new(),
                            artifact_id: String::new(),
                            version: String::new(),
                        });
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                text = e.unescape().unwrap_or_default().to_string();
            }
            Ok(Event::End(_)) => {
                let ctx = context(&path);
                let leaf = path.last().map(|s| s.as_str()).unwrap_or_default();

                if path.len() == 3 && path.get(1).map(|s| s.as_str()) == Some("properties") {
                    pom.properties.insert(leaf.to_string(), text.clone());
                }

                if let Some(ref mut d) = dep {
                    if let Some(ref mut excl) = exclusion {
                        match leaf {
                            "groupId" => excl.group_id = text.clone(),
                            "artifactId" => excl.artifact_id = Some(text.clone()),
                            _ => {}
                        }
                        if ctx.ends_with(">exclusions>exclusion") {
                            d.exclusions.push(exclusion.take().unwrap_or_default());
                        }
                    } else {
                        match leaf {
                            "groupId" if ctx.ends_with(">dependency>groupId") => {
                                d.group_id = text.clone();
                            }
                            "artifactId" if ctx.ends_with(">dependency>artifactId") => {
                                d.artifact_id = text.clone();
                            }
                            "version" if ctx.ends_with(">dependency>version") => {
                                d.version = Some(text.clone());
                            }
                            "scope" if ctx.ends_with(">dependency>scope") => {
                                d.scope = Some(text.clone());
                            }
                            "optional" if ctx.ends_with(">dependency>optional") => {
                                d.optional = text.trim() == "true";
                            }
                            "classifier" if ctx.ends_with(">dependency>classifier") => {
                                d.classifier = Some(text.clone());
                            }
                            _ => {}
                        }
                    }
                    if ctx == "project>dependencies>dependency"
                        || ctx == "project>dependencyManagement>dependencies>dependency"
                    {
                        let d = dep.take().unwrap_or_default();
                        if in_dep_mgmt {
                            pom.dependency_management.push(d);
                        } else {
                            pom.dependencies.push(d);
                        }
                    }
                }

                if let Some(ref mut p) = parent {
                    match leaf {
                        "groupId" if ctx == "project>parent>groupId" => p.group_id = text.clone(),
                        "artifactId" if ctx == "project>parent>artifactId" => {
                            p.artifact_id = text.clone();
                        }
                        "version" if ctx == "project>parent>version" => p.version = text.clone(),
                        _ => {}
                    }
                    if ctx == "project>parent" {
                        pom.parent = parent.take();
                    }
                }

                if path.len() == 2 {
                    match leaf {
                        "groupId" => pom.group_id = Some(text.clone()),
                        "artifactId" => pom.artifact_id = Some(text.clone()),
                        "version" => pom.version = Some(text.clone()),
                        _ => {}
                    }
                }

                path.pop();
                text.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(JavelinError::Manifest {
                    message: format!("failed to parse POM XML: {e}"),
                }
                .into());
            }
            _ => {}
        }
    }

    Ok(pom)
}

fn context(path: &[String]) -> String {
    path.join(">")
}

//! Concept repository: concepts, typed edges, and graph queries.
//!
//! Parent and prerequisite edges must stay acyclic within their own kind. The
//! check runs inside the same transaction as the insert, against the edges of
//! that kind as they are at that moment.

use std::collections::{BTreeSet, HashMap};

use lerni_core::entities::{Concept, ConceptEdge};
use lerni_core::enums::Relationship;
use lerni_core::errors::CoreError;
use lerni_core::graph::ConceptGraph;
use lerni_core::ids::PREFIX_CONCEPT;
use lerni_core::responses::{ConceptDetail, ConceptNeighbors};
use tracing::debug;

use crate::error::DatabaseError;
use crate::helpers::{
    fmt_datetime, get_opt_string, non_blank, parse_datetime, parse_enum, parse_string_list,
    placeholders, query_count, to_json_text,
};
use crate::service::LerniService;
use crate::{finish, generate_id};

const CONCEPT_COLS: &str = "id, name, aliases, description, created_at";
const EDGE_COLS: &str = "from_id, to_id, relationship";

fn row_to_concept(row: &libsql::Row) -> Result<Concept, DatabaseError> {
    Ok(Concept {
        id: row.get(0)?,
        name: row.get(1)?,
        aliases: parse_string_list(&row.get::<String>(2)?)?,
        description: get_opt_string(row, 3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

fn row_to_edge(row: &libsql::Row) -> Result<ConceptEdge, DatabaseError> {
    Ok(ConceptEdge {
        from_id: row.get(0)?,
        to_id: row.get(1)?,
        relationship: parse_enum(&row.get::<String>(2)?)?,
    })
}

pub(crate) async fn fetch_concept(
    conn: &libsql::Connection,
    id: &str,
) -> Result<Option<Concept>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {CONCEPT_COLS} FROM concepts WHERE id = ?1"),
            [id],
        )
        .await?;
    rows.next().await?.map(|row| row_to_concept(&row)).transpose()
}

pub(crate) async fn require_concept(
    conn: &libsql::Connection,
    id: &str,
) -> Result<Concept, DatabaseError> {
    fetch_concept(conn, id)
        .await?
        .ok_or_else(|| DatabaseError::not_found("concept", id))
}

async fn query_concepts(
    conn: &libsql::Connection,
    sql: &str,
    params: impl libsql::params::IntoParams,
) -> Result<Vec<Concept>, DatabaseError> {
    let mut rows = conn.query(sql, params).await?;
    let mut concepts = Vec::new();
    while let Some(row) = rows.next().await? {
        concepts.push(row_to_concept(&row)?);
    }
    Ok(concepts)
}

/// Fetch concepts by id, preserving the order of `ids`.
async fn concepts_by_ids(
    conn: &libsql::Connection,
    ids: &[String],
) -> Result<Vec<Concept>, DatabaseError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT {CONCEPT_COLS} FROM concepts WHERE id IN ({})",
        placeholders(1, ids.len())
    );
    let params = ids.iter().map(|id| libsql::Value::from(id.clone()));
    let mut by_id: HashMap<String, Concept> =
        query_concepts(conn, &sql, libsql::params_from_iter(params))
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();
    Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
}

async fn query_edges(
    conn: &libsql::Connection,
    sql: &str,
    params: impl libsql::params::IntoParams,
) -> Result<Vec<ConceptEdge>, DatabaseError> {
    let mut rows = conn.query(sql, params).await?;
    let mut edges = Vec::new();
    while let Some(row) = rows.next().await? {
        edges.push(row_to_edge(&row)?);
    }
    Ok(edges)
}

pub(crate) async fn load_graph(
    conn: &libsql::Connection,
    relationship: Relationship,
) -> Result<ConceptGraph, DatabaseError> {
    let edges = query_edges(
        conn,
        &format!("SELECT {EDGE_COLS} FROM concept_edges WHERE relationship = ?1"),
        [relationship.as_str()],
    )
    .await?;
    Ok(ConceptGraph::from_edges(relationship, &edges))
}

fn normalize_aliases(name: &str, aliases: &[String]) -> BTreeSet<String> {
    aliases
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty() && !a.eq_ignore_ascii_case(name))
        .map(String::from)
        .collect()
}

impl LerniService {
    /// Create a concept. Names are unique, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for an empty or already-used name.
    pub async fn create_concept(
        &self,
        name: &str,
        description: Option<&str>,
        aliases: &[String],
    ) -> Result<Concept, DatabaseError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DatabaseError::validation("Concept name must not be empty"));
        }
        let concept = Concept {
            id: String::new(),
            name: name.to_string(),
            aliases: normalize_aliases(name, aliases),
            description: non_blank(description),
            created_at: self.now(),
        };

        let tx = self.db().begin().await?;
        let result: Result<Concept, DatabaseError> = async {
            let existing = query_count(
                &tx,
                "SELECT COUNT(*) FROM concepts WHERE name = ?1 COLLATE NOCASE",
                [name],
            )
            .await?;
            if existing > 0 {
                return Err(DatabaseError::validation(format!(
                    "Concept '{name}' already exists"
                )));
            }

            let id = generate_id(&tx, PREFIX_CONCEPT).await?;
            tx.execute(
                &format!("INSERT INTO concepts ({CONCEPT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
                libsql::params![
                    id.as_str(),
                    concept.name.as_str(),
                    to_json_text(&concept.aliases)?,
                    concept.description.as_deref(),
                    fmt_datetime(concept.created_at)
                ],
            )
            .await?;
            Ok(Concept {
                id,
                ..concept.clone()
            })
        }
        .await;
        let created = finish(tx, result).await?;
        debug!(concept_id = %created.id, name = %created.name, "created concept");
        Ok(created)
    }

    pub async fn get_concept(&self, id: &str) -> Result<Concept, DatabaseError> {
        require_concept(self.db().conn(), id).await
    }

    /// Resolve a concept by id, then by name, then by alias (case-insensitive).
    pub async fn find_concept(&self, reference: &str) -> Result<Concept, DatabaseError> {
        let reference = reference.trim();
        let conn = self.db().conn();
        if let Some(concept) = fetch_concept(conn, reference).await? {
            return Ok(concept);
        }

        let by_name = query_concepts(
            conn,
            &format!("SELECT {CONCEPT_COLS} FROM concepts WHERE name = ?1 COLLATE NOCASE"),
            [reference],
        )
        .await?;
        if let Some(concept) = by_name.into_iter().next() {
            return Ok(concept);
        }

        self.list_concepts()
            .await?
            .into_iter()
            .find(|c| c.matches_name(reference))
            .ok_or_else(|| DatabaseError::not_found("concept", reference))
    }

    pub async fn list_concepts(&self) -> Result<Vec<Concept>, DatabaseError> {
        query_concepts(
            self.db().conn(),
            &format!("SELECT {CONCEPT_COLS} FROM concepts ORDER BY name COLLATE NOCASE"),
            (),
        )
        .await
    }

    /// Concepts with no outgoing parent edge.
    pub async fn list_root_concepts(&self) -> Result<Vec<Concept>, DatabaseError> {
        query_concepts(
            self.db().conn(),
            &format!(
                "SELECT {CONCEPT_COLS} FROM concepts
                 WHERE id NOT IN (SELECT from_id FROM concept_edges WHERE relationship = 'parent')
                 ORDER BY name COLLATE NOCASE"
            ),
            (),
        )
        .await
    }

    /// Case-insensitive substring match over names and aliases.
    pub async fn search_concepts(&self, query: &str) -> Result<Vec<Concept>, DatabaseError> {
        let needle = query.trim().to_lowercase();
        Ok(self
            .list_concepts()
            .await?
            .into_iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&needle)
                    || c.aliases.iter().any(|a| a.to_lowercase().contains(&needle))
            })
            .collect())
    }

    /// Add a typed edge `from -> to`.
    ///
    /// # Errors
    ///
    /// - `CoreError::Validation` for a self-loop or an existing identical edge.
    /// - `CoreError::NotFound` if either endpoint is missing.
    /// - `CoreError::Cycle` if a parent or prerequisite edge would close a cycle.
    pub async fn add_edge(
        &self,
        from: &str,
        to: &str,
        relationship: Relationship,
    ) -> Result<ConceptEdge, DatabaseError> {
        if from == to {
            return Err(DatabaseError::validation(format!(
                "Cannot link concept {from} to itself"
            )));
        }
        let now = self.now();

        let tx = self.db().begin().await?;
        let result: Result<ConceptEdge, DatabaseError> = async {
            require_concept(&tx, from).await?;
            require_concept(&tx, to).await?;

            let duplicates = query_count(
                &tx,
                "SELECT COUNT(*) FROM concept_edges
                 WHERE from_id = ?1 AND to_id = ?2 AND relationship = ?3",
                libsql::params![from, to, relationship.as_str()],
            )
            .await?;
            if duplicates > 0 {
                return Err(DatabaseError::validation(format!(
                    "Edge {from} -> {to} ({relationship}) already exists"
                )));
            }

            if relationship.is_hierarchical() {
                let graph = load_graph(&tx, relationship).await?;
                if graph.would_create_cycle(from, to) {
                    return Err(CoreError::Cycle {
                        from: from.to_string(),
                        to: to.to_string(),
                        relationship,
                    }
                    .into());
                }
            }

            tx.execute(
                "INSERT INTO concept_edges (from_id, to_id, relationship, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                libsql::params![from, to, relationship.as_str(), fmt_datetime(now)],
            )
            .await?;
            Ok(ConceptEdge {
                from_id: from.to_string(),
                to_id: to.to_string(),
                relationship,
            })
        }
        .await;
        let edge = finish(tx, result).await?;
        debug!(from, to, %relationship, "added concept edge");
        Ok(edge)
    }

    /// Remove an edge. Returns `false` if it did not exist.
    pub async fn remove_edge(
        &self,
        from: &str,
        to: &str,
        relationship: Relationship,
    ) -> Result<bool, DatabaseError> {
        let removed = self
            .db()
            .conn()
            .execute(
                "DELETE FROM concept_edges WHERE from_id = ?1 AND to_id = ?2 AND relationship = ?3",
                libsql::params![from, to, relationship.as_str()],
            )
            .await?;
        if removed > 0 {
            debug!(from, to, %relationship, "removed concept edge");
        }
        Ok(removed > 0)
    }

    /// All edges touching `concept_id`, in either direction.
    pub async fn edges_for(&self, concept_id: &str) -> Result<Vec<ConceptEdge>, DatabaseError> {
        query_edges(
            self.db().conn(),
            &format!(
                "SELECT {EDGE_COLS} FROM concept_edges
                 WHERE from_id = ?1 OR to_id = ?1
                 ORDER BY relationship, from_id, to_id"
            ),
            [concept_id],
        )
        .await
    }

    /// Snapshot of every edge of one kind, for traversal.
    pub async fn concept_graph(
        &self,
        relationship: Relationship,
    ) -> Result<ConceptGraph, DatabaseError> {
        load_graph(self.db().conn(), relationship).await
    }

    /// Concepts reached from `concept_id` along `relationship` edges,
    /// nearest first, each once.
    ///
    /// The ids come from the lazy [`ConceptGraph::ancestors`] walk, but rows
    /// are fetched in one query, so the whole walk is collected here. Callers
    /// that want to stop early should walk [`Self::concept_graph`] directly.
    pub async fn ancestors(
        &self,
        concept_id: &str,
        relationship: Relationship,
    ) -> Result<Vec<Concept>, DatabaseError> {
        let conn = self.db().conn();
        require_concept(conn, concept_id).await?;
        let graph = load_graph(conn, relationship).await?;
        let ids: Vec<String> = graph.ancestors(concept_id).map(String::from).collect();
        concepts_by_ids(conn, &ids).await
    }

    /// Concepts that reach `concept_id` along `relationship` edges, nearest
    /// first. Collected eagerly, like [`Self::ancestors`].
    pub async fn descendants(
        &self,
        concept_id: &str,
        relationship: Relationship,
    ) -> Result<Vec<Concept>, DatabaseError> {
        let conn = self.db().conn();
        require_concept(conn, concept_id).await?;
        let graph = load_graph(conn, relationship).await?;
        let ids: Vec<String> = graph.descendants(concept_id).map(String::from).collect();
        concepts_by_ids(conn, &ids).await
    }

    /// Direct neighbors grouped by kind and direction.
    pub async fn neighbors(&self, concept_id: &str) -> Result<ConceptNeighbors, DatabaseError> {
        let mut parents = Vec::new();
        let mut children = Vec::new();
        let mut prerequisites = Vec::new();
        let mut required_by = Vec::new();
        let mut related = Vec::new();

        for edge in self.edges_for(concept_id).await? {
            let outgoing = edge.from_id == concept_id;
            let other = if outgoing { edge.to_id } else { edge.from_id };
            let bucket = match (edge.relationship, outgoing) {
                (Relationship::Parent, true) => &mut parents,
                (Relationship::Parent, false) => &mut children,
                (Relationship::Prerequisite, true) => &mut prerequisites,
                (Relationship::Prerequisite, false) => &mut required_by,
                (Relationship::Related, _) => &mut related,
            };
            if !bucket.contains(&other) {
                bucket.push(other);
            }
        }

        let conn = self.db().conn();
        Ok(ConceptNeighbors {
            parents: concepts_by_ids(conn, &parents).await?,
            children: concepts_by_ids(conn, &children).await?,
            prerequisites: concepts_by_ids(conn, &prerequisites).await?,
            required_by: concepts_by_ids(conn, &required_by).await?,
            related: concepts_by_ids(conn, &related).await?,
        })
    }

    pub async fn concept_detail(&self, concept_id: &str) -> Result<ConceptDetail, DatabaseError> {
        let concept = self.get_concept(concept_id).await?;
        let neighbors = self.neighbors(concept_id).await?;
        let question_count = query_count(
            self.db().conn(),
            "SELECT COUNT(*) FROM questions WHERE concept_id = ?1",
            [concept_id],
        )
        .await?;
        Ok(ConceptDetail {
            concept,
            neighbors,
            question_count,
        })
    }

    /// Delete a concept that nothing references.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::ConceptInUse` if any edge or question references it.
    pub async fn delete_concept(&self, concept_id: &str) -> Result<(), DatabaseError> {
        let tx = self.db().begin().await?;
        let result: Result<(), DatabaseError> = async {
            require_concept(&tx, concept_id).await?;
            let edges = query_count(
                &tx,
                "SELECT COUNT(*) FROM concept_edges WHERE from_id = ?1 OR to_id = ?1",
                [concept_id],
            )
            .await?;
            let questions = query_count(
                &tx,
                "SELECT COUNT(*) FROM questions WHERE concept_id = ?1",
                [concept_id],
            )
            .await?;
            if edges > 0 || questions > 0 {
                return Err(CoreError::ConceptInUse {
                    id: concept_id.to_string(),
                    edges,
                    questions,
                }
                .into());
            }
            tx.execute("DELETE FROM concepts WHERE id = ?1", [concept_id])
                .await?;
            Ok(())
        }
        .await;
        finish(tx, result).await?;
        debug!(concept_id, "deleted concept");
        Ok(())
    }
}

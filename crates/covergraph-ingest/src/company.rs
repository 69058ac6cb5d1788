//! Company knowledge graph builder: products → categories → knowledge.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use covergraph_core::{rel, CompanyGraph, CompanyNode, CompanyNodeKind, GraphEdge};

use crate::category::categorize_tags;

/// A knowledge document attached to a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeDoc {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A product record from the external product store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub knowledge_base: Vec<KnowledgeDoc>,
}

/// Weak cross-product relations get half weight relative to containment.
const CROSS_PRODUCT_DAMPENING: f64 = 0.5;

/// Builds an immutable `CompanyGraph` from a snapshot of product records.
pub struct CompanyGraphBuilder;

impl CompanyGraphBuilder {
    /// Rebuild the whole graph from source records.
    pub fn build(products: &[ProductRecord]) -> CompanyGraph {
        let mut nodes: Vec<CompanyNode> = Vec::new();
        let mut edges: Vec<GraphEdge> = Vec::new();
        // Category name → node position, so categories are shared.
        let mut category_index: HashMap<String, usize> = HashMap::new();
        // Knowledge node position → owning product id, for the cross-reference pass.
        let mut knowledge_owner: Vec<(usize, String)> = Vec::new();

        for product in products {
            let product_id = format!("p-{}", product.id);
            let product_pos = nodes.len();
            nodes.push(CompanyNode {
                id: product_id.clone(),
                kind: CompanyNodeKind::Product,
                name: product.name.clone(),
                description: product.description.clone(),
                tags: BTreeSet::new(),
                parent_id: None,
                child_ids: Vec::new(),
                coverage: 0,
                color: CompanyNodeKind::Product.color().to_string(),
            });

            for (doc_index, doc) in product.knowledge_base.iter().enumerate() {
                let knowledge_id = format!("k-{}-{}", product.id, doc_index);
                let tags: BTreeSet<String> =
                    doc.tags.iter().map(|t| t.to_lowercase()).collect();

                let category = categorize_tags(tags.iter().map(String::as_str));
                let category_pos = *category_index
                    .entry(category.to_string())
                    .or_insert_with(|| {
                        let pos = nodes.len();
                        nodes.push(CompanyNode {
                            id: format!("c-{}", category),
                            kind: CompanyNodeKind::Category,
                            name: category.to_string(),
                            description: String::new(),
                            tags: BTreeSet::new(),
                            parent_id: None,
                            child_ids: Vec::new(),
                            coverage: 0,
                            color: CompanyNodeKind::Category.color().to_string(),
                        });
                        pos
                    });

                let knowledge_pos = nodes.len();
                nodes.push(CompanyNode {
                    id: knowledge_id.clone(),
                    kind: CompanyNodeKind::Knowledge,
                    name: doc.title.clone(),
                    description: doc.content.clone(),
                    tags,
                    parent_id: Some(product_id.clone()),
                    child_ids: Vec::new(),
                    coverage: 0,
                    color: CompanyNodeKind::Knowledge.color().to_string(),
                });

                edges.push(GraphEdge::new(&product_id, &knowledge_id, rel::CONTAINS, 1.0));
                let category_id = nodes[category_pos].id.clone();
                edges.push(GraphEdge::new(category_id, &knowledge_id, rel::CATEGORIZES, 1.0));

                nodes[product_pos].child_ids.push(knowledge_id.clone());
                nodes[category_pos].child_ids.push(knowledge_id.clone());
                knowledge_owner.push((knowledge_pos, product_id.clone()));
            }
        }

        Self::compute_coverage(&mut nodes, &edges);
        Self::cross_reference(&nodes, &knowledge_owner, &mut edges);

        debug!(
            "Company graph built: {} products, {} nodes, {} edges",
            products.len(),
            nodes.len(),
            edges.len()
        );

        CompanyGraph { nodes, edges }
    }

    /// Coverage per product: percentage of its knowledge children that were
    /// linked beyond containment (a category edge), rounded; 0 with no
    /// children.
    fn compute_coverage(nodes: &mut [CompanyNode], edges: &[GraphEdge]) {
        let categorized: HashSet<&str> = edges
            .iter()
            .filter(|e| e.relationship == rel::CATEGORIZES)
            .map(|e| e.target.as_str())
            .collect();

        for node in nodes.iter_mut() {
            if node.kind != CompanyNodeKind::Product {
                continue;
            }
            if node.child_ids.is_empty() {
                node.coverage = 0;
                continue;
            }
            let linked = node
                .child_ids
                .iter()
                .filter(|id| categorized.contains(id.as_str()))
                .count();
            node.coverage =
                (linked as f64 / node.child_ids.len() as f64 * 100.0).round() as u32;
        }
    }

    /// Relate knowledge nodes of *different* products whose tag sets
    /// overlap. Cross-product relations are weaker evidence than explicit
    /// containment, hence the dampening factor.
    fn cross_reference(
        nodes: &[CompanyNode],
        knowledge_owner: &[(usize, String)],
        edges: &mut Vec<GraphEdge>,
    ) {
        for (i, (pos_a, owner_a)) in knowledge_owner.iter().enumerate() {
            for (pos_b, owner_b) in knowledge_owner.iter().skip(i + 1) {
                if owner_a == owner_b {
                    continue;
                }
                let a = &nodes[*pos_a];
                let b = &nodes[*pos_b];
                let overlap = a.tags.intersection(&b.tags).count();
                if overlap == 0 {
                    continue;
                }
                let denom = a.tags.len().max(b.tags.len()).max(1);
                let weight = overlap as f64 / denom as f64 * CROSS_PRODUCT_DAMPENING;
                edges.push(GraphEdge::new(&a.id, &b.id, rel::RELATED, weight));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(title: &str, tags: &[&str]) -> KnowledgeDoc {
        KnowledgeDoc {
            title: title.to_string(),
            content: format!("{} content", title),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn product(id: &str, docs: Vec<KnowledgeDoc>) -> ProductRecord {
        ProductRecord {
            id: id.to_string(),
            name: format!("Product {}", id),
            description: String::new(),
            knowledge_base: docs,
        }
    }

    #[test]
    fn test_empty_input() {
        let graph = CompanyGraphBuilder::build(&[]);
        assert!(graph.is_empty());
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn test_builds_typed_nodes_and_edges() {
        let products = vec![product("a", vec![doc("Install guide", &["install"])])];
        let graph = CompanyGraphBuilder::build(&products);

        // Product, category, knowledge.
        assert_eq!(graph.nodes.len(), 3);
        let knowledge: Vec<_> = graph.knowledge_nodes().collect();
        assert_eq!(knowledge.len(), 1);
        assert_eq!(knowledge[0].parent_id.as_deref(), Some("p-a"));

        let category = graph
            .nodes
            .iter()
            .find(|n| n.kind == CompanyNodeKind::Category)
            .unwrap();
        assert_eq!(category.name, "setup");

        assert!(graph
            .edges
            .iter()
            .any(|e| e.relationship == rel::CONTAINS && e.source == "p-a"));
        assert!(graph
            .edges
            .iter()
            .any(|e| e.relationship == rel::CATEGORIZES && e.source == "c-setup"));
    }

    #[test]
    fn test_categories_are_shared() {
        let products = vec![
            product("a", vec![doc("Install A", &["install"])]),
            product("b", vec![doc("Install B", &["setup"])]),
        ];
        let graph = CompanyGraphBuilder::build(&products);
        let categories: Vec<_> = graph
            .nodes
            .iter()
            .filter(|n| n.kind == CompanyNodeKind::Category)
            .collect();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].child_ids.len(), 2);
    }

    #[test]
    fn test_unknown_tags_fall_back_to_other() {
        let products = vec![product("a", vec![doc("Mystery", &["xyzzy"])])];
        let graph = CompanyGraphBuilder::build(&products);
        assert!(graph.nodes.iter().any(|n| n.id == "c-other"));
    }

    #[test]
    fn test_product_coverage() {
        let products = vec![
            product("a", vec![doc("D1", &["install"]), doc("D2", &["billing"])]),
            product("empty", vec![]),
        ];
        let graph = CompanyGraphBuilder::build(&products);

        let covered = graph.nodes.iter().find(|n| n.id == "p-a").unwrap();
        assert_eq!(covered.coverage, 100);

        let empty = graph.nodes.iter().find(|n| n.id == "p-empty").unwrap();
        assert_eq!(empty.coverage, 0);
    }

    #[test]
    fn test_cross_product_related_edges() {
        let products = vec![
            product("a", vec![doc("Guide A", &["install", "linux"])]),
            product("b", vec![doc("Guide B", &["install", "macos", "arm"])]),
        ];
        let graph = CompanyGraphBuilder::build(&products);

        let related: Vec<_> = graph
            .edges
            .iter()
            .filter(|e| e.relationship == rel::RELATED)
            .collect();
        assert_eq!(related.len(), 1);
        // overlap 1 / max(2, 3) * 0.5
        assert!((related[0].weight - 1.0 / 3.0 * 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_no_related_edges_within_one_product() {
        let products = vec![product(
            "a",
            vec![
                doc("Guide 1", &["install", "linux"]),
                doc("Guide 2", &["install", "macos"]),
            ],
        )];
        let graph = CompanyGraphBuilder::build(&products);
        assert!(!graph.edges.iter().any(|e| e.relationship == rel::RELATED));
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let products = vec![
            product("a", vec![doc("D1", &["install"])]),
            product("b", vec![doc("D2", &["billing"])]),
        ];
        let first = CompanyGraphBuilder::build(&products);
        let second = CompanyGraphBuilder::build(&products);
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }
}

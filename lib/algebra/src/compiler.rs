use crate::algebra::{Algebra, Table};
use crate::element::{Element, Query, QueryType};
use crate::expression::{Aggregate, Expression};
use crate::solution::TabularData;

/// Translates a parsed query into an [Algebra] tree.
///
/// Compilation is purely structural and deterministic: it never touches a
/// graph or store, and pattern order is preserved for the execution engine.
pub trait QueryCompiler {
    fn compile(&self, query: &Query) -> Algebra;
}

/// The standard compiler.
#[derive(Debug, Default)]
pub struct DefaultQueryCompiler;

impl QueryCompiler for DefaultQueryCompiler {
    fn compile(&self, query: &Query) -> Algebra {
        let mut algebra = match &query.where_clause {
            None => Algebra::unit_table(),
            Some(element) => self.compile_element(element),
        };

        // A query-level VALUES clause is joined against the WHERE algebra so
        // that neither side is dropped.
        if let Some(values) = &query.values_clause {
            let table = compile_data(values);
            algebra = if algebra.is_unit_table() {
                table
            } else {
                Algebra::join(algebra, table)
            };
        }

        let needs_grouping = !query.group_expressions.is_empty()
            || !query.having_conditions.is_empty()
            || query
                .projections
                .iter()
                .any(|(_, e)| e.as_ref().is_some_and(Expression::has_aggregate));

        let mut assignments: Vec<(String, Expression)> = Vec::new();
        if needs_grouping {
            let mut aggregators: Vec<(Aggregate, String)> = Vec::new();
            for (name, expression) in &query.projections {
                if let Some(expression) = expression {
                    assignments
                        .push((name.clone(), allocate_slots(expression, &mut aggregators)));
                }
            }
            // HAVING aggregates are re-evaluated through their own slot
            // references, never by sharing the projection expression object.
            let having: Vec<Expression> = query
                .having_conditions
                .iter()
                .map(|condition| allocate_slots(condition, &mut aggregators))
                .collect();

            algebra = Algebra::GroupBy {
                group_expressions: query.group_expressions.clone(),
                aggregators,
                inner: Box::new(algebra),
            };
            if !having.is_empty() {
                algebra = Algebra::Filter {
                    expressions: having,
                    inner: Box::new(algebra),
                };
            }
        } else {
            for (name, expression) in &query.projections {
                if let Some(expression) = expression {
                    assignments.push((name.clone(), expression.clone()));
                }
            }
        }
        if !assignments.is_empty() {
            algebra = Algebra::Extend {
                assignments,
                inner: Box::new(algebra),
            };
        }

        if !query.sort_conditions.is_empty() {
            algebra = Algebra::OrderBy {
                conditions: query.sort_conditions.clone(),
                inner: Box::new(algebra),
            };
        }

        if !query.projections.is_empty() {
            algebra = Algebra::Project {
                variables: query.projections.iter().map(|(name, _)| name.clone()).collect(),
                inner: Box::new(algebra),
            };
        }

        match query.query_type {
            QueryType::SelectDistinct | QueryType::SelectAllDistinct => {
                algebra = Algebra::Distinct {
                    inner: Box::new(algebra),
                };
            }
            QueryType::SelectReduced | QueryType::SelectAllReduced => {
                algebra = Algebra::Reduced {
                    inner: Box::new(algebra),
                };
            }
            _ => {}
        }

        if query.has_limit() || query.has_offset() {
            algebra = Algebra::Slice {
                limit: if query.has_limit() { query.limit } else { -1 },
                offset: if query.has_offset() { query.offset } else { 0 },
                inner: Box::new(algebra),
            };
        }

        algebra
    }
}

impl DefaultQueryCompiler {
    fn compile_element(&self, element: &Element) -> Algebra {
        match element {
            Element::TripleBlock(triples) => {
                if triples.is_empty() {
                    Algebra::unit_table()
                } else {
                    Algebra::Bgp(triples.clone())
                }
            }
            Element::PathBlock(paths) => {
                if paths.is_empty() {
                    return Algebra::unit_table();
                }
                let plain: Vec<_> = paths
                    .iter()
                    .filter_map(|path| path.as_triple())
                    .collect();
                let mut algebra = if plain.is_empty() {
                    Algebra::unit_table()
                } else {
                    Algebra::Bgp(plain)
                };
                // Real paths wrap in declaration order: the last declared
                // path becomes the outermost node.
                for path in paths.iter().filter(|path| path.is_path()) {
                    algebra = Algebra::PropertyPath {
                        path: path.clone(),
                        inner: Box::new(algebra),
                    };
                }
                algebra
            }
            Element::Group(elements) => self.compile_group(elements),
            Element::Union(elements) => match elements.split_first() {
                None => Algebra::unit_table(),
                Some((first, [])) => self.compile_element(first),
                Some((first, rest)) => {
                    // right-deep chain in declaration order
                    let mut iter = rest.iter().rev();
                    let last = iter
                        .next()
                        .map(|element| self.compile_element(element))
                        .unwrap_or_else(Algebra::unit_table);
                    let rhs = iter.fold(last, |acc, element| Algebra::Union {
                        lhs: Box::new(self.compile_element(element)),
                        rhs: Box::new(acc),
                    });
                    Algebra::Union {
                        lhs: Box::new(self.compile_element(first)),
                        rhs: Box::new(rhs),
                    }
                }
            },
            Element::Optional(inner) => Algebra::LeftJoin {
                lhs: Box::new(Algebra::unit_table()),
                rhs: Box::new(self.compile_element(inner)),
            },
            Element::Minus(inner) => Algebra::Minus {
                lhs: Box::new(Algebra::unit_table()),
                rhs: Box::new(self.compile_element(inner)),
            },
            Element::Filter(expressions) => Algebra::Filter {
                expressions: expressions.clone(),
                inner: Box::new(Algebra::unit_table()),
            },
            Element::Bind(assignments) => Algebra::Extend {
                assignments: assignments.clone(),
                inner: Box::new(Algebra::unit_table()),
            },
            Element::Data(data) => compile_data(data),
            Element::SubQuery(query) => self.compile(query),
            Element::Service {
                inner,
                endpoint,
                silent,
            } => Algebra::Service {
                endpoint: endpoint.clone(),
                silent: *silent,
                inner: Box::new(self.compile_element(inner)),
            },
        }
    }

    fn compile_group(&self, elements: &[Element]) -> Algebra {
        let mut accumulated: Option<Algebra> = None;
        let mut filters: Vec<Expression> = Vec::new();
        for element in elements {
            match element {
                // Filters apply to the whole group, after all non-filter
                // siblings have been joined.
                Element::Filter(expressions) => filters.extend(expressions.iter().cloned()),
                Element::Optional(inner) => {
                    accumulated = Some(Algebra::LeftJoin {
                        lhs: Box::new(accumulated.unwrap_or_else(Algebra::unit_table)),
                        rhs: Box::new(self.compile_element(inner)),
                    });
                }
                Element::Minus(inner) => {
                    accumulated = Some(Algebra::Minus {
                        lhs: Box::new(accumulated.unwrap_or_else(Algebra::unit_table)),
                        rhs: Box::new(self.compile_element(inner)),
                    });
                }
                Element::Bind(new_assignments) => {
                    // consecutive binds accumulate into one Extend
                    accumulated = Some(match accumulated {
                        Some(Algebra::Extend {
                            mut assignments,
                            inner,
                        }) => {
                            assignments.extend(new_assignments.iter().cloned());
                            Algebra::Extend { assignments, inner }
                        }
                        other => Algebra::Extend {
                            assignments: new_assignments.clone(),
                            inner: Box::new(other.unwrap_or_else(Algebra::unit_table)),
                        },
                    });
                }
                other => {
                    let compiled = self.compile_element(other);
                    accumulated = Some(match accumulated {
                        None => compiled,
                        Some(algebra) => Algebra::join(algebra, compiled),
                    });
                }
            }
        }
        let algebra = accumulated.unwrap_or_else(Algebra::unit_table);
        if filters.is_empty() {
            algebra
        } else {
            Algebra::Filter {
                expressions: filters,
                inner: Box::new(algebra),
            }
        }
    }
}

fn compile_data(data: &TabularData) -> Algebra {
    if data.variables.is_empty() && data.rows.is_empty() {
        Algebra::empty_table()
    } else {
        Algebra::Table(Table::Data(data.clone()))
    }
}

// Allocates (or reuses) a slot variable for every aggregate in the
// expression, returning the expression with the aggregates replaced by slot
// references. Structurally equal aggregates share one slot.
fn allocate_slots(
    expression: &Expression,
    aggregators: &mut Vec<(Aggregate, String)>,
) -> Expression {
    expression.map_aggregates(&mut |aggregate| {
        let slot = match aggregators
            .iter()
            .find(|(existing, _)| existing == aggregate)
        {
            Some((_, slot)) => slot.clone(),
            None => {
                // a leading dot is not expressible in a query, so slots can
                // never collide with user variables
                let slot = format!(".agg{}", aggregators.len());
                aggregators.push((aggregate.clone(), slot.clone()));
                slot
            }
        };
        Expression::Variable(slot)
    })
}

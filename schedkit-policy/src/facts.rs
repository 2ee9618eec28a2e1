/*
 * Copyright (c) 2025 Clément GRENNERAT
 *
 * This program is free software: you can redistribute it and/or modify it under the terms of the
 * GNU General Public License as published by the Free Software Foundation, version 3.
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without
 * even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
 * See the GNU General Public License for more details.
 * You should have received a copy of the GNU General Public License along with this program.
 * If not, see https://www.gnu.org/licenses/.
 *
 */

//! Named fact producers with declared dependencies, loaded sequentially in
//! topological order.

use crate::error::{BoxError, PolicyError};
use futures::future::BoxFuture;
use indexmap::IndexMap;
use log::debug;
use serde_json::Value;
use std::collections::HashMap;

/// Loaded facts by name, in load (topological) order.
pub type FactMap = IndexMap<Box<str>, Value>;

pub type FactLoader<I> =
    Box<dyn for<'a> Fn(&'a I, &'a FactMap) -> BoxFuture<'a, Result<Value, BoxError>> + Send + Sync>;

/// A named fact: an asynchronous producer that sees every declared
/// dependency already present in the fact map when it runs.
pub struct FactDef<I> {
    pub(crate) name: Box<str>,
    pub(crate) depends_on: Vec<Box<str>>,
    pub(crate) loader: FactLoader<I>,
}

impl<I> FactDef<I> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn depends_on(&self) -> &[Box<str>] {
        &self.depends_on
    }
}

/// Builds a fact definition from a name, its dependency names and a loader
/// closure returning a boxed future.
pub fn fact<I, F>(name: &str, depends_on: &[&str], loader: F) -> FactDef<I>
where
    F: for<'a> Fn(&'a I, &'a FactMap) -> BoxFuture<'a, Result<Value, BoxError>>
        + Send
        + Sync
        + 'static,
{
    FactDef {
        name: name.into(),
        depends_on: depends_on.iter().map(|&d| d.into()).collect(),
        loader: Box::new(loader),
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    InProgress,
    Done,
}

fn visit<'d, I>(
    def: &'d FactDef<I>,
    by_name: &HashMap<&'d str, &'d FactDef<I>>,
    marks: &mut HashMap<&'d str, Mark>,
    order: &mut Vec<&'d FactDef<I>>,
) -> Result<(), PolicyError> {
    match marks.get(&*def.name) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::InProgress) => return Err(PolicyError::CycleDetected(def.name.clone())),
        None => {}
    }
    marks.insert(&def.name, Mark::InProgress);
    for dep in &def.depends_on {
        let dep_def = by_name
            .get(&**dep)
            .ok_or_else(|| PolicyError::UnknownDependency {
                fact: def.name.clone(),
                dependency: dep.clone(),
            })?;
        visit(dep_def, by_name, marks, order)?;
    }
    marks.insert(&def.name, Mark::Done);
    order.push(def);
    Ok(())
}

/// Depth-first topological order over the definitions. Fails fast on a
/// cycle or a reference to an undeclared fact, naming the offender.
pub(crate) fn topological_order<I>(defs: &[FactDef<I>]) -> Result<Vec<&FactDef<I>>, PolicyError> {
    let by_name: HashMap<&str, &FactDef<I>> = defs.iter().map(|d| (&*d.name, d)).collect();
    let mut marks = HashMap::new();
    let mut order = Vec::with_capacity(defs.len());
    for def in defs {
        visit(def, &by_name, &mut marks, &mut order)?;
    }
    Ok(order)
}

/// Loads every fact sequentially in topological order. The resulting map's
/// iteration order is the load order, and its key set is exactly the
/// definition set.
pub(crate) async fn load_facts<I: Sync>(
    defs: &[FactDef<I>],
    input: &I,
) -> Result<FactMap, PolicyError> {
    let order = topological_order(defs)?;
    let mut facts = FactMap::with_capacity(defs.len());
    for def in order {
        debug!("loading fact '{}'", def.name);
        let value = (def.loader)(input, &facts)
            .await
            .map_err(|source| PolicyError::FactLoad {
                fact: def.name.clone(),
                source,
            })?;
        facts.insert(def.name.clone(), value);
    }
    Ok(facts)
}

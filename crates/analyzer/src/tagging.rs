//! Bulk tagging over the keyed collections of the program database.

use rustc_hash::FxHashSet;
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::model::{Class, Field, Member, Method, StringValue, Tag, TagCategory};
use crate::program::ProgramDatabase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TaggableCollection {
    Classes,
    Fields,
    Methods,
    Strings,
}

/// What a tagging predicate gets to look at.
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Class(&'a Class),
    Field(&'a Field),
    Method(&'a Method),
    String(&'a StringValue),
}

impl EntityRef<'_> {
    pub fn is_missing(&self) -> bool {
        match self {
            EntityRef::Class(class) => class.is_missing(),
            EntityRef::Field(field) => field.is_missing(),
            EntityRef::Method(method) => method.is_missing(),
            EntityRef::String(_) => false,
        }
    }
}

enum Target {
    Class(crate::model::ClassId),
    Field(crate::model::FieldId),
    Method(crate::model::MethodId),
    String(usize),
}

impl ProgramDatabase {
    /// Tags every entry of `collection` accepted by `predicate`, which receives
    /// the entry key (FQCN, signature or literal) and the entity. Returns the
    /// number of entries tagged.
    pub fn tag_if<P>(&mut self, collection: TaggableCollection, mut predicate: P, tag: &Tag) -> usize
    where
        P: FnMut(&str, EntityRef<'_>) -> bool,
    {
        let targets: Vec<Target> = match collection {
            TaggableCollection::Classes => self
                .classes
                .iter()
                .filter(|(key, id)| predicate(key, EntityRef::Class(self.class(**id))))
                .map(|(_, id)| Target::Class(*id))
                .collect(),
            // Inherited views share their member; each member is offered once,
            // under the first signature that reached it.
            TaggableCollection::Fields => {
                let mut seen = FxHashSet::default();
                self.fields
                    .iter()
                    .filter(|(_, view)| seen.insert(view.member))
                    .filter(|(key, view)| predicate(key, EntityRef::Field(self.field(view.member))))
                    .map(|(_, view)| Target::Field(view.member))
                    .collect()
            }
            TaggableCollection::Methods => {
                let mut seen = FxHashSet::default();
                self.methods
                    .iter()
                    .filter(|(_, view)| seen.insert(view.member))
                    .filter(|(key, view)| predicate(key, EntityRef::Method(self.method(view.member))))
                    .map(|(_, view)| Target::Method(view.member))
                    .collect()
            }
            TaggableCollection::Strings => self
                .strings
                .iter()
                .enumerate()
                .filter(|(_, value)| predicate(&value.value, EntityRef::String(*value)))
                .map(|(i, _)| Target::String(i))
                .collect(),
        };

        let tagged = targets.len();
        for target in targets {
            match target {
                Target::Class(id) => self.class_mut(id).tags.add(tag.clone()),
                Target::Field(id) => self.field_mut(id).tags.add(tag.clone()),
                Target::Method(id) => self.method_mut(id).tags.add(tag.clone()),
                Target::String(i) => {
                    if let Some(value) = self.strings.iter_mut().nth(i) {
                        value.tags.add(tag.clone());
                    }
                }
            }
        }
        tagged
    }

    pub fn tag_all_if<P>(&mut self, mut predicate: P, tag: &Tag) -> usize
    where
        P: FnMut(&str, EntityRef<'_>) -> bool,
    {
        TaggableCollection::iter()
            .map(|collection| self.tag_if(collection, &mut predicate, tag))
            .sum()
    }

    pub fn tag_all(&mut self, tag: &Tag) -> usize {
        self.tag_all_if(|_, _| true, tag)
    }

    pub fn tag_all_as_internal(&mut self) -> usize {
        self.tag_all(&Tag::Internal)
    }

    pub fn add_tag_category(&mut self, name: &str, tags: Vec<String>) {
        self.tag_categories.insert(
            name,
            TagCategory {
                name: name.to_string(),
                tags,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::MethodDef;
    use crate::model::{FieldRef, InstructionRef, Link, MethodRef, Modifiers, Tags};
    use crate::resolution::Resolver;

    fn sample() -> ProgramDatabase {
        let mut db = ProgramDatabase::new();
        let main = db.add_class("com.app.Main");
        let run = db.register_method(main, MethodDef::new("run", "()V"));
        Resolver::new(&mut db).resolve_field(&FieldRef::new("android.os.Build", "MODEL", "Ljava/lang/String;"));
        db.strings.insert(StringValue {
            source: run,
            instruction: InstructionRef {
                method: run,
                block: 0,
                index: 0,
            },
            value: "content://sms".to_string(),
            tags: Tags::default(),
        });
        db
    }

    #[test]
    fn test_tag_all_as_internal_reaches_every_collection() {
        let mut db = sample();

        let tagged = db.tag_all_as_internal();

        assert_eq!(tagged, 5, "two classes, one field, one method, one string");
        assert!(db.all_classes().all(|(_, c)| c.tags.internal));
        assert!(db.all_methods().all(|(_, m)| m.tags.internal));
        assert!(db.strings().iter().all(|s| s.tags.internal));
    }

    #[test]
    fn test_tag_if_applies_predicate_per_entity() {
        let mut db = sample();
        let external = Tag::from("external");

        let tagged = db.tag_if(
            TaggableCollection::Classes,
            |_, entity| entity.is_missing(),
            &external,
        );

        assert_eq!(tagged, 1);
        let build = db.class_by_name("android.os.Build").unwrap();
        let main = db.class_by_name("com.app.Main").unwrap();
        assert!(db.class(build).tags.contains("external"));
        assert!(!db.class(main).tags.contains("external"));
    }

    #[test]
    fn test_tag_all_if_matches_keys() {
        let mut db = sample();

        let tagged = db.tag_all_if(|key, _| key.starts_with("content://"), &Tag::from("uri"));

        assert_eq!(tagged, 1);
        assert!(db.strings().iter().next().unwrap().tags.contains("uri"));
    }

    #[test]
    fn test_inherited_views_are_tagged_once() {
        let mut db = ProgramDatabase::new();
        let base = db.add_class("com.app.Base");
        db.register_method(base, MethodDef::new("start", "()V").with_modifiers(Modifiers::public()));
        for fqcn in ["com.app.Left", "com.app.Right"] {
            let sub = db.add_class(fqcn);
            db.class_mut(sub).extends = Some(Link::Resolved(base));
            Resolver::new(&mut db).resolve_method(&MethodRef::new(fqcn, "start", "()V"), false);
        }
        assert_eq!(db.methods().len(), 3, "one definition, two inherited views");

        let mut offered = Vec::new();
        let tagged = db.tag_if(
            TaggableCollection::Methods,
            |key, _| {
                offered.push(key.to_string());
                true
            },
            &Tag::from("lifecycle"),
        );

        assert_eq!(tagged, 1);
        assert_eq!(offered, vec!["com.app.Base.start()V".to_string()]);
    }

    #[test]
    fn test_collections_display_in_snake_case() {
        let names: Vec<String> = TaggableCollection::iter().map(|c| c.to_string()).collect();
        assert_eq!(names, vec!["classes", "fields", "methods", "strings"]);
    }
}

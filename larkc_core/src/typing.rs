use std::num::NonZeroU64;

use ahash::AHashMap;

use crate::utils::SSAMap;

derive_everything! {
    #[derive(serde::Serialize, serde::Deserialize)]
    #[repr(transparent)]
    pub struct TypeId(pub NonZeroU64);
}

impl TypeId {
    pub fn is_builtin(&self) -> bool {
        u64::from(self.0) <= 255
    }
}

impl From<TypeId> for usize {
    fn from(tid: TypeId) -> Self {
        tid.0.get() as usize
    }
}

impl From<usize> for TypeId {
    fn from(n: usize) -> Self {
        Self(NonZeroU64::new(n as u64).unwrap())
    }
}

macro_rules! builtins {
    ($(.$tag:literal = $name:ident { $display:literal, $size:literal },)+) => {
        /// A ZST used to associate builtin type constants with.
        pub struct TypingConstants;

        #[allow(missing_docs, non_upper_case_globals, dead_code)]
        impl TypingConstants {
            $(
                pub const $name: self::TypeId = self::TypeId(unsafe { ::std::num::NonZeroU64::new_unchecked($tag) });
            )*
        }

        /// An enum of all builtin types.
        #[derive(Debug, PartialEq, PartialOrd, Clone, Copy, Eq, Ord, Hash)]
        #[repr(u8)]
        pub enum BuiltinType {
            $(
                #[allow(missing_docs)]
                $name = $tag
            ),*
        }

        impl self::BuiltinType {
            /// The size of this type in bytes.
            pub fn size_in_bytes(&self) -> u32 {
                match self {
                    $(
                        Self::$name => $size
                    ),*
                }
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $(
                        Self::$name => $display
                    ),*
                }
            }

            /// Initialize an empty SSAMap with the builtin types.
            pub fn write_ssa(map: &mut crate::utils::SSAMap<self::TypeId, self::LarkType>) {
                assert!(map.is_empty());

                $(
                    map.skip_to_nth(Self::$name as usize).unwrap();

                    let bltn = map.insert(self::LarkType::Builtin { inner: Self::$name });

                    assert_eq!(usize::from(bltn), $tag, "builtin tag mismatch! builtin was specified with the constant {} but the SSAMap allocated it with {}", $tag, usize::from(bltn));
                )*
            }
        }

        impl ::std::fmt::Display for self::BuiltinType {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    $(
                        Self::$name => write!(f, concat!("{{", $display, "}}")),
                    )*
                }
            }
        }
    };
}

builtins!(
    .1 = Int { "Int", 8 },
    .2 = Float { "Float", 8 },
    .3 = Char { "Char", 4 },
    .4 = Str { "Str", 16 },
    .5 = Bool { "Bool", 1 },
    .6 = Unit { "Unit", 0 },
    .7 = ObjectPtr { "Builtin.ObjectPointer", 8 },
    // a "never" type, produced by terminators.
    .255 = Never { "Never", 0 },
);

/// A Lark type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum LarkType {
    /// The address of a location holding a value of the pointee type.
    LValue { pointee: TypeId },

    /// A heterogeneous aggregate; `(X, Y)` holds an X and a Y.
    Tuple { members: Vec<TypeId> },

    /// A callable object with a signature of `(params*) -> ret`.
    Callable { params: Vec<TypeId>, ret: TypeId },

    /// The type of the type `of` itself.
    Metatype { of: TypeId },

    /// Any builtin primitive type.
    Builtin { inner: BuiltinType },
}

/// An interning store of `LarkType`s, preloaded with the builtins.
///
/// Identical types always intern to the same `TypeId` so type equality is
/// id equality.
#[derive(Debug, Clone)]
pub struct TypeStore {
    map: SSAMap<TypeId, LarkType>,
    cache: AHashMap<LarkType, TypeId>,
}

impl Default for TypeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeStore {
    pub fn new() -> Self {
        let mut map = SSAMap::new();

        BuiltinType::write_ssa(&mut map);

        let cache = map.iter().map(|(id, ty)| (ty.clone(), id)).collect();

        Self { map, cache }
    }

    /// Intern a type, returning the existing id when an identical type is
    /// already present.
    pub fn insert(&mut self, ty: LarkType) -> TypeId {
        if let Some(id) = self.cache.get(&ty) {
            return *id;
        }

        let id = self.map.insert(ty.clone());
        self.cache.insert(ty, id);

        id
    }

    pub fn get(&self, id: TypeId) -> Option<&LarkType> {
        self.map.get(id)
    }

    /// The lvalue (address) type of `pointee`.
    pub fn lvalue_of(&mut self, pointee: TypeId) -> TypeId {
        self.insert(LarkType::LValue { pointee })
    }

    /// The pointee of an lvalue type, `None` if `id` is not an lvalue.
    pub fn pointee_of(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id)? {
            LarkType::LValue { pointee } => Some(*pointee),
            _ => None,
        }
    }

    pub fn is_lvalue(&self, id: TypeId) -> bool {
        self.pointee_of(id).is_some()
    }

    pub fn tuple_of(&mut self, members: Vec<TypeId>) -> TypeId {
        self.insert(LarkType::Tuple { members })
    }

    /// The member types of a tuple type, `None` if `id` is not a tuple.
    pub fn tuple_members(&self, id: TypeId) -> Option<&[TypeId]> {
        match self.get(id)? {
            LarkType::Tuple { members } => Some(members.as_slice()),
            _ => None,
        }
    }

    pub fn callable_of(&mut self, params: Vec<TypeId>, ret: TypeId) -> TypeId {
        self.insert(LarkType::Callable { params, ret })
    }

    /// The return type of a callable type, `None` if `id` is not callable.
    pub fn return_type_of(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id)? {
            LarkType::Callable { ret, .. } => Some(*ret),
            _ => None,
        }
    }

    pub fn metatype_of(&mut self, of: TypeId) -> TypeId {
        self.insert(LarkType::Metatype { of })
    }

    pub fn is_bool(&self, id: TypeId) -> bool {
        id == TypingConstants::Bool
    }

    pub fn is_unit(&self, id: TypeId) -> bool {
        id == TypingConstants::Unit
    }

    /// A human-readable rendering of the type behind `id`.
    pub fn display_type(&self, id: TypeId) -> Option<String> {
        let st = match self.get(id)? {
            LarkType::Builtin { inner } => inner.name().to_string(),

            LarkType::LValue { pointee } => format!("&{}", self.display_type(*pointee)?),

            LarkType::Tuple { members } => {
                let members = members
                    .iter()
                    .map(|m| self.display_type(*m))
                    .collect::<Option<Vec<_>>>()?;

                format!("({})", members.join(", "))
            }

            LarkType::Callable { params, ret } => {
                let params = params
                    .iter()
                    .map(|p| self.display_type(*p))
                    .collect::<Option<Vec<_>>>()?;

                format!("({}) -> {}", params.join(", "), self.display_type(*ret)?)
            }

            LarkType::Metatype { of } => format!("metatype({})", self.display_type(*of)?),
        };

        Some(st)
    }
}

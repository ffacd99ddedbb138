/// 单值或任意深度的嵌套列表
///
/// `select`、`from`、`group_by`、IN / BETWEEN 值列表以及原生片段的绑定值都接受 `Arg`，
/// 使用前统一展开为一维列表。
#[derive(Debug, Clone, PartialEq)]
pub enum Arg<T> {
    Item(T),
    List(Vec<Arg<T>>),
}

impl<T> Arg<T> {
    /// 深度优先、从左到右展开，保留重复项
    pub fn flatten(self) -> Vec<T> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(self, out: &mut Vec<T>) {
        match self {
            Arg::Item(item) => out.push(item),
            Arg::List(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
        }
    }
}

/// 展开一组参数
pub fn flatten<T>(args: impl IntoIterator<Item = Arg<T>>) -> Vec<T> {
    let mut out = Vec::new();
    for arg in args {
        arg.flatten_into(&mut out);
    }
    out
}

impl<T, U: Into<Arg<T>>> From<Vec<U>> for Arg<T> {
    fn from(items: Vec<U>) -> Self {
        Arg::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T, U: Into<Arg<T>>, const N: usize> From<[U; N]> for Arg<T> {
    fn from(items: [U; N]) -> Self {
        Arg::List(items.into_iter().map(Into::into).collect())
    }
}
